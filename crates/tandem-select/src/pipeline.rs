//! The selection pipeline: distance, clusters, pairs, cointegration.

use crate::clusters::{ClusterAssignment, cluster_with};
use crate::cointegration::{CointegrationConfig, CointegrationTester};
use crate::config::SelectionConfig;
use crate::distance::{DistanceEngine, DistanceMatrix};
use crate::error::{InputShapeError, Result, SelectionError};
use crate::pairs::{CandidatePair, generate_pairs};
use crate::table::PairTable;
use std::fmt;
use tandem_cluster::{DensityClusterer, Optics};
use tandem_data::{MarketFactorSeries, PriceLevelPanel, ReturnPanel};
use tracing::{info, warn};

/// Everything a run produced, for reporting and diagnostics.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// Pairwise distances
    pub distances: DistanceMatrix,
    /// Cluster labels
    pub assignment: ClusterAssignment,
    /// Candidate pairs in generation order
    pub candidates: Vec<CandidatePair>,
    /// Candidates actually tested
    pub tested: usize,
    /// Accepted pairs
    pub table: PairTable,
}

impl SelectionOutcome {
    /// Candidates left untested by the cap.
    pub fn skipped(&self) -> usize {
        self.candidates.len() - self.tested
    }
}

/// Runs the pipeline with a fixed configuration.
pub struct PairSelector {
    config: SelectionConfig,
    clusterer: Box<dyn DensityClusterer + Send + Sync>,
}

impl fmt::Debug for PairSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairSelector")
            .field("config", &self.config)
            .field("clusterer", &self.clusterer.name())
            .finish()
    }
}

impl Default for PairSelector {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}

impl PairSelector {
    /// Selector clustering with OPTICS configured from `config`.
    pub fn new(config: SelectionConfig) -> Self {
        let clusterer = Box::new(Optics::new(config.optics_config()));
        Self { config, clusterer }
    }

    /// Selector with a custom clusterer; the clustering fields of `config`
    /// are then unused.
    pub fn with_clusterer<C>(config: SelectionConfig, clusterer: C) -> Self
    where
        C: DensityClusterer + Send + Sync + 'static,
    {
        Self {
            config,
            clusterer: Box::new(clusterer),
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Accepted pairs.
    ///
    /// # Errors
    /// See [`PairSelector::run`].
    pub fn select(
        &self,
        returns: &ReturnPanel,
        market: &MarketFactorSeries,
        levels: &PriceLevelPanel,
    ) -> Result<PairTable> {
        Ok(self.run(returns, market, levels)?.table)
    }

    /// Run every stage and keep the intermediate results.
    ///
    /// # Errors
    /// - [`SelectionError::InvalidConfig`] when the configuration is invalid
    /// - [`SelectionError::InputShape`] when the inputs are empty or not
    ///   aligned on instruments and dates
    /// - [`SelectionError::Cluster`] when the clusterer rejects the distances
    pub fn run(
        &self,
        returns: &ReturnPanel,
        market: &MarketFactorSeries,
        levels: &PriceLevelPanel,
    ) -> Result<SelectionOutcome> {
        self.config.validate().map_err(SelectionError::InvalidConfig)?;
        check_inputs(returns, market, levels)?;

        let distances = DistanceEngine::new(self.config.parallel).compute(returns, market)?;
        let assignment = cluster_with(self.clusterer.as_ref(), &distances)?;
        let candidates = generate_pairs(&assignment);

        let tested = match self.config.max_candidate_pairs {
            Some(cap) if cap < candidates.len() => {
                warn!(
                    cap,
                    skipped = candidates.len() - cap,
                    "candidate cap reached; remaining pairs not tested"
                );
                cap
            }
            _ => candidates.len(),
        };

        let tester = CointegrationTester::new(CointegrationConfig {
            pvalue_threshold: self.config.pvalue_threshold,
            lags: self.config.cointegration_lags,
            parallel: self.config.parallel,
        });
        let table = tester.test_pairs(&candidates[..tested], levels);

        info!(
            instruments = returns.n_instruments(),
            clusters = assignment.n_clusters(),
            noise = assignment.noise().len(),
            candidates = candidates.len(),
            tested,
            accepted = table.len(),
            "pair selection complete"
        );

        Ok(SelectionOutcome {
            distances,
            assignment,
            candidates,
            tested,
            table,
        })
    }
}

/// Reject empty or misaligned inputs. The pipeline never aligns or imputes.
///
/// # Errors
/// Returns the first violated condition, checked in this order: no
/// instruments, no observations, instrument lists differ, market dates
/// differ, level dates differ.
pub fn check_inputs(
    returns: &ReturnPanel,
    market: &MarketFactorSeries,
    levels: &PriceLevelPanel,
) -> std::result::Result<(), InputShapeError> {
    if returns.n_instruments() == 0 {
        return Err(InputShapeError::NoInstruments);
    }
    if returns.n_observations() == 0 {
        return Err(InputShapeError::NoObservations);
    }
    if returns.n_instruments() != levels.n_instruments() {
        return Err(InputShapeError::InstrumentCountMismatch {
            returns: returns.n_instruments(),
            levels: levels.n_instruments(),
        });
    }
    if let Some((index, (r, l))) = returns
        .instruments()
        .iter()
        .zip(levels.instruments())
        .enumerate()
        .find(|(_, (r, l))| r != l)
    {
        return Err(InputShapeError::InstrumentMismatch {
            index,
            returns: r.clone(),
            levels: l.clone(),
        });
    }
    if market.dates() != returns.dates() {
        return Err(InputShapeError::DateMismatch {
            input: "market factor series",
        });
    }
    if levels.dates() != returns.dates() {
        return Err(InputShapeError::DateMismatch {
            input: "price level panel",
        });
    }
    Ok(())
}

/// Run the pipeline with default settings apart from `min_samples` and the
/// p-value threshold.
///
/// # Errors
/// See [`PairSelector::run`].
pub fn select_pairs(
    returns: &ReturnPanel,
    market: &MarketFactorSeries,
    levels: &PriceLevelPanel,
    min_samples: usize,
    pvalue_threshold: f64,
) -> Result<PairTable> {
    PairSelector::new(SelectionConfig::new(min_samples, pvalue_threshold)).select(returns, market, levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::tests::dates;
    use ndarray::{Array2, array};
    use rstest::rstest;
    use tandem_cluster::{ClusterError, Labels};

    fn returns(names: &[&str], n: usize) -> ReturnPanel {
        let values = Array2::from_shape_fn((n, names.len()), |(t, j)| ((t * 7 + j * 3) % 5) as f64 - 2.0);
        ReturnPanel::new(dates(n), names.iter().map(|s| s.to_string()).collect(), values).unwrap()
    }

    fn levels(names: &[&str], n: usize) -> PriceLevelPanel {
        let values = Array2::from_shape_fn((n, names.len()), |(t, j)| 100.0 + (t + j) as f64);
        PriceLevelPanel::new(dates(n), names.iter().map(|s| s.to_string()).collect(), values).unwrap()
    }

    fn market(n: usize) -> MarketFactorSeries {
        MarketFactorSeries::new("MKT", dates(n), ndarray::Array1::from_iter((0..n).map(|t| (t % 3) as f64))).unwrap()
    }

    #[test]
    fn test_empty_universe() {
        let r = ReturnPanel::new(dates(5), Vec::new(), Array2::zeros((5, 0))).unwrap();
        let l = PriceLevelPanel::new(dates(5), Vec::new(), Array2::zeros((5, 0))).unwrap();
        let err = select_pairs(&r, &market(5), &l, 2, 0.05).unwrap_err();
        assert!(matches!(err, SelectionError::InputShape(InputShapeError::NoInstruments)));
    }

    #[test]
    fn test_no_observations() {
        let r = returns(&["A", "B"], 0);
        let l = levels(&["A", "B"], 0);
        let err = select_pairs(&r, &market(0), &l, 2, 0.05).unwrap_err();
        assert!(matches!(err, SelectionError::InputShape(InputShapeError::NoObservations)));
    }

    #[rstest]
    #[case(&["A", "B", "C"], InputShapeError::InstrumentCountMismatch { returns: 2, levels: 3 })]
    #[case(&["B", "A"], InputShapeError::InstrumentMismatch { index: 0, returns: "A".into(), levels: "B".into() })]
    fn test_instrument_mismatch(#[case] level_names: &[&str], #[case] expected: InputShapeError) {
        let r = returns(&["A", "B"], 6);
        let l = levels(level_names, 6);
        assert_eq!(check_inputs(&r, &market(6), &l), Err(expected));
    }

    #[test]
    fn test_date_mismatch() {
        let r = returns(&["A", "B"], 6);
        let shifted = MarketFactorSeries::new("MKT", dates(7)[1..].to_vec(), array![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]).unwrap();
        assert_eq!(
            check_inputs(&r, &shifted, &levels(&["A", "B"], 6)),
            Err(InputShapeError::DateMismatch { input: "market factor series" })
        );
        assert_eq!(
            check_inputs(&r, &market(6), &levels(&["A", "B"], 7)),
            Err(InputShapeError::DateMismatch { input: "price level panel" })
        );
    }

    #[test]
    fn test_invalid_config() {
        let selector = PairSelector::new(SelectionConfig::new(1, 0.05));
        let err = selector
            .select(&returns(&["A", "B"], 6), &market(6), &levels(&["A", "B"], 6))
            .unwrap_err();
        assert!(matches!(err, SelectionError::InvalidConfig(_)));
    }

    #[derive(Debug)]
    struct AllNoise;

    impl DensityClusterer for AllNoise {
        fn fit_predict(&self, distances: ndarray::ArrayView2<'_, f64>) -> std::result::Result<Labels, ClusterError> {
            Ok(vec![tandem_cluster::NOISE; distances.nrows()])
        }

        fn name(&self) -> &'static str {
            "all-noise"
        }
    }

    #[test]
    fn test_custom_clusterer_and_empty_table() {
        let selector = PairSelector::with_clusterer(SelectionConfig::default(), AllNoise);
        let outcome = selector
            .run(&returns(&["A", "B", "C"], 8), &market(8), &levels(&["A", "B", "C"], 8))
            .unwrap();
        assert!(outcome.candidates.is_empty());
        assert!(outcome.table.is_empty());
        assert_eq!(outcome.assignment.noise().len(), 3);
        assert!(format!("{selector:?}").contains("all-noise"));
    }

    #[derive(Debug)]
    struct OneCluster;

    impl DensityClusterer for OneCluster {
        fn fit_predict(&self, distances: ndarray::ArrayView2<'_, f64>) -> std::result::Result<Labels, ClusterError> {
            Ok(vec![0; distances.nrows()])
        }

        fn name(&self) -> &'static str {
            "one-cluster"
        }
    }

    #[test]
    fn test_candidate_cap() {
        let config = SelectionConfig {
            max_candidate_pairs: Some(2),
            ..SelectionConfig::default()
        };
        let names = ["A", "B", "C", "D"];
        let outcome = PairSelector::with_clusterer(config, OneCluster)
            .run(&returns(&names, 10), &market(10), &levels(&names, 10))
            .unwrap();
        assert_eq!(outcome.candidates.len(), 6);
        assert_eq!(outcome.tested, 2);
        assert_eq!(outcome.skipped(), 4);
    }
}
