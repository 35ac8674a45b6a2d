//! Partial-correlation distance between instruments.
//!
//! For instruments x and y and market m the distance is `1 - |pcorr|` with
//!
//! ```text
//! pcorr = (r_xy - r_xm * r_ym) / sqrt((1 - r_xm^2) * (1 - r_ym^2))
//! ```
//!
//! Two fallbacks apply. A numerically constant market skips partialling and
//! uses `1 - |r_xy|`. A pair whose denominator vanishes (x or y collinear with
//! the market) has `pcorr = 0`, i.e. distance 1.

use crate::error::{InputShapeError, Result};
use ndarray::{Array1, Array2, ArrayView2};
use rayon::prelude::*;
use tandem_data::{MarketFactorSeries, ReturnPanel};
use tandem_stats::correlation::{correlation_of_standardized, partial_correlation, standardize};
use tracing::{debug, info, warn};

/// Symmetric instrument-by-instrument distances in `[0, 1]` with a zero
/// diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    instruments: Vec<String>,
    values: Array2<f64>,
}

impl DistanceMatrix {
    /// Instruments in row/column order.
    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Matrix view.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Number of instruments.
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// True for an empty universe.
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Distance by position.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    /// Distance by instrument id.
    pub fn between(&self, first: &str, second: &str) -> Option<f64> {
        let i = self.instruments.iter().position(|s| s == first)?;
        let j = self.instruments.iter().position(|s| s == second)?;
        Some(self.values[[i, j]])
    }
}

/// Computes [`DistanceMatrix`]es, optionally on the rayon pool.
#[derive(Debug, Clone, Copy)]
pub struct DistanceEngine {
    parallel: bool,
}

impl Default for DistanceEngine {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Entries of one row of the upper triangle plus its collinear-pair count.
type RowResult = (Vec<f64>, usize);

struct Prepared {
    standardized: Vec<Option<Array1<f64>>>,
    /// Correlation of each instrument with the market; `None` when the market
    /// is degenerate
    market_correlations: Option<Vec<f64>>,
}

impl Prepared {
    fn row(&self, i: usize) -> RowResult {
        let n = self.standardized.len();
        let mut entries = Vec::with_capacity(n - i - 1);
        let mut collinear = 0;
        for j in (i + 1)..n {
            let r_xy = correlation_of_standardized(
                self.standardized[i].as_ref(),
                self.standardized[j].as_ref(),
            );
            let distance = match &self.market_correlations {
                None => 1.0 - r_xy.abs(),
                Some(r_m) => match partial_correlation(r_xy, r_m[i], r_m[j]) {
                    Some(pcorr) => 1.0 - pcorr.abs(),
                    None => {
                        collinear += 1;
                        1.0
                    }
                },
            };
            entries.push(distance);
        }
        (entries, collinear)
    }
}

impl DistanceEngine {
    /// Create an engine.
    pub const fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Whether rows are computed on the rayon pool.
    pub const fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Distance matrix of the panel's instruments, controlling for `market`.
    ///
    /// # Errors
    /// Returns [`InputShapeError::LengthMismatch`] when the market series and
    /// the panel differ in length.
    pub fn compute(&self, returns: &ReturnPanel, market: &MarketFactorSeries) -> Result<DistanceMatrix> {
        let n = returns.n_instruments();
        let t = returns.n_observations();
        if market.len() != t {
            return Err(InputShapeError::LengthMismatch {
                what: "market factor series",
                expected: t,
                actual: market.len(),
            }
            .into());
        }

        let standardized: Vec<_> = (0..n).map(|j| standardize(returns.column(j))).collect();
        let market_z = standardize(market.values());
        let market_correlations = market_z.as_ref().map(|m| {
            standardized
                .iter()
                .map(|z| correlation_of_standardized(z.as_ref(), Some(m)))
                .collect()
        });

        if market_correlations.is_none() {
            warn!(
                market = market.name(),
                "market factor has zero variance; using plain correlation distance"
            );
        }
        let degenerate_instruments = standardized.iter().filter(|z| z.is_none()).count();
        if degenerate_instruments > 0 {
            debug!(degenerate_instruments, "constant return series treated as uncorrelated");
        }

        let prepared = Prepared {
            standardized,
            market_correlations,
        };

        let rows: Vec<RowResult> = if self.parallel {
            (0..n).into_par_iter().map(|i| prepared.row(i)).collect()
        } else {
            (0..n).map(|i| prepared.row(i)).collect()
        };

        let mut values = Array2::<f64>::zeros((n, n));
        let mut collinear_pairs = 0;
        for (i, (entries, collinear)) in rows.into_iter().enumerate() {
            collinear_pairs += collinear;
            for (offset, distance) in entries.into_iter().enumerate() {
                let j = i + 1 + offset;
                values[[i, j]] = distance;
                values[[j, i]] = distance;
            }
        }

        info!(
            instruments = n,
            observations = t,
            degenerate_market = prepared.market_correlations.is_none(),
            collinear_pairs,
            "distance matrix computed"
        );

        Ok(DistanceMatrix {
            instruments: returns.instruments().to_vec(),
            values,
        })
    }
}

/// Distance matrix with the default engine.
///
/// # Errors
/// See [`DistanceEngine::compute`].
pub fn compute_distance(returns: &ReturnPanel, market: &MarketFactorSeries) -> Result<DistanceMatrix> {
    DistanceEngine::default().compute(returns, market)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use ndarray::array;
    use tandem_stats::correlation::pearson;

    pub(crate) fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n).map(|i| start + chrono::Duration::days(i as i64)).collect()
    }

    fn panel(values: Array2<f64>) -> ReturnPanel {
        let names = (0..values.ncols()).map(|j| format!("S{j}")).collect();
        ReturnPanel::new(dates(values.nrows()), names, values).unwrap()
    }

    fn market(values: Array1<f64>) -> MarketFactorSeries {
        MarketFactorSeries::new("MKT", dates(values.len()), values).unwrap()
    }

    #[test]
    fn test_basic_properties() {
        let returns = panel(array![
            [1.0, 2.0, -1.0],
            [-0.5, -1.0, 0.3],
            [2.0, 3.5, 0.1],
            [0.2, 0.1, -0.8],
            [-1.0, -2.2, 0.9],
        ]);
        let m = market(array![0.5, -0.2, 1.0, 0.0, -0.6]);
        let d = compute_distance(&returns, &m).unwrap();

        for i in 0..3 {
            assert_eq!(d.get(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(d.get(i, j), d.get(j, i));
                assert!((0.0..=1.0).contains(&d.get(i, j)));
            }
        }
        assert_eq!(d.between("S0", "S2"), Some(d.get(0, 2)));
        assert!(d.between("S0", "XX").is_none());
    }

    #[test]
    fn test_degenerate_market_uses_plain_correlation() {
        let returns = panel(array![[1.0, 2.0], [2.0, 1.0], [3.0, 5.0], [4.0, 3.0]]);
        let flat = market(array![0.3, 0.3, 0.3, 0.3]);
        let d = compute_distance(&returns, &flat).unwrap();

        let r = pearson(returns.column(0), returns.column(1)).unwrap();
        assert_eq!(d.get(0, 1), 1.0 - r.abs());
    }

    #[test]
    fn test_instrument_collinear_with_market_is_maximally_distant() {
        let m = array![1.0, -1.0, 2.0, 0.5, -0.5];
        let returns = panel(ndarray::stack![
            ndarray::Axis(1),
            m.mapv(|v| 2.0 * v),
            array![0.3, 0.1, -0.4, 0.2, 0.0]
        ]);
        let d = compute_distance(&returns, &market(m)).unwrap();
        assert_eq!(d.get(0, 1), 1.0);
    }

    #[test]
    fn test_known_partial_correlation() {
        // x and y both load on the market plus a shared component.
        let m = array![1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let s = array![1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0];
        let x = &m + &s;
        let y = &m * 0.5 + &s;
        let returns = panel(ndarray::stack![ndarray::Axis(1), x, y]);
        let d = compute_distance(&returns, &market(m)).unwrap();
        // m and s are orthogonal, so after removing m both are exactly s.
        assert_abs_diff_eq!(d.get(0, 1), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let returns = panel(array![
            [0.1, 0.4, -0.3, 0.9],
            [0.5, -0.2, 0.8, -0.1],
            [-0.7, 0.3, 0.2, 0.6],
            [0.2, 0.9, -0.5, 0.0],
            [-0.3, -0.6, 0.4, 0.3],
            [0.8, 0.1, -0.9, -0.4],
        ]);
        let m = market(array![0.2, 0.1, -0.3, 0.5, -0.1, 0.4]);
        let par = DistanceEngine::new(true).compute(&returns, &m).unwrap();
        let seq = DistanceEngine::new(false).compute(&returns, &m).unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn test_constant_instrument() {
        let returns = panel(array![[1.0, 0.0], [2.0, 0.0], [0.5, 0.0], [3.0, 0.0]]);
        let m = market(array![0.1, 0.3, -0.2, 0.4]);
        let d = compute_distance(&returns, &m).unwrap();
        assert_eq!(d.get(0, 1), 1.0);
    }

    #[test]
    fn test_market_length_mismatch() {
        let returns = panel(array![[1.0], [2.0], [3.0]]);
        let m = market(array![0.1, 0.2]);
        assert!(compute_distance(&returns, &m).is_err());
    }
}
