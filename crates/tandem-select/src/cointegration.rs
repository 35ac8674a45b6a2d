//! Engle-Granger testing of candidate pairs.

use crate::pairs::CandidatePair;
use crate::table::PairTable;
use ndarray::{Array1, ArrayView1, s};
use rayon::prelude::*;
use serde::Serialize;
use tandem_data::PriceLevelPanel;
use tandem_stats::{CriticalValues, LagSelection, engle_granger, polyfit};
use tracing::{debug, info, warn};

/// An accepted pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CointegrationResult {
    /// First instrument (the regressor of the hedge ratio)
    pub first: String,
    /// Second instrument
    pub second: String,
    /// Engle-Granger p-value
    pub pvalue: f64,
    /// Units of `first` per unit of `second` in the spread
    /// `second - hedge_ratio * first`
    pub hedge_ratio: f64,
    /// Mean-reversion half-life in observations; `None` when undefined
    pub half_life: Option<f64>,
    /// Cluster the pair came from
    pub cluster: i64,
    /// Engle-Granger statistic
    pub statistic: f64,
    /// MacKinnon critical values for this sample size
    pub critical_values: CriticalValues,
    /// Price observations used
    pub nobs: usize,
}

impl CointegrationResult {
    /// The instrument pair.
    pub fn pair(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

/// OLS slope of `s2` on `s1` with an intercept.
pub fn hedge_ratio(s1: ArrayView1<'_, f64>, s2: ArrayView1<'_, f64>) -> Option<f64> {
    polyfit(s1, s2).map(|line| line.slope)
}

/// `s2 - hedge_ratio * s1`.
pub fn spread(s1: ArrayView1<'_, f64>, s2: ArrayView1<'_, f64>, hedge_ratio: f64) -> Array1<f64> {
    &s2 - &(&s1 * hedge_ratio)
}

/// Half-life of a spread from a lag-1 autoregression.
///
/// Regresses `spread_t - spread_{t-1}` on `spread_{t-1}` with an intercept
/// over `t = 2..n`, giving slope `beta` and `theta = -beta`. The half-life
/// is `ln 2 / theta` for `theta > 0` and undefined otherwise, or when fewer
/// than three aligned points remain.
pub fn half_life(spread: ArrayView1<'_, f64>) -> Option<f64> {
    let n = spread.len();
    if n < 5 {
        return None;
    }
    let lagged = spread.slice(s![1..n - 1]);
    let diff = &spread.slice(s![2..]) - &lagged;
    let beta = polyfit(lagged, diff.view())?.slope;
    let theta = -beta;
    if theta > 0.0 {
        let value = std::f64::consts::LN_2 / theta;
        value.is_finite().then_some(value)
    } else {
        None
    }
}

/// Parameters of the cointegration stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CointegrationConfig {
    /// Accept when the p-value is strictly below this
    pub pvalue_threshold: f64,
    /// Residual ADF lag policy
    pub lags: LagSelection,
    /// Test candidates on the rayon pool
    pub parallel: bool,
}

impl Default for CointegrationConfig {
    fn default() -> Self {
        Self {
            pvalue_threshold: 0.05,
            lags: LagSelection::default(),
            parallel: true,
        }
    }
}

/// Runs Engle-Granger tests over candidate pairs.
#[derive(Debug, Clone, Default)]
pub struct CointegrationTester {
    config: CointegrationConfig,
}

impl CointegrationTester {
    /// Create a tester.
    pub const fn new(config: CointegrationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &CointegrationConfig {
        &self.config
    }

    /// Test one candidate; `None` when rejected or untestable.
    pub fn test_pair(&self, pair: &CandidatePair, levels: &PriceLevelPanel) -> Option<CointegrationResult> {
        let (Some(s1), Some(s2)) = (levels.series(&pair.first), levels.series(&pair.second)) else {
            warn!(
                first = %pair.first,
                second = %pair.second,
                "instrument missing from price level panel; pair skipped"
            );
            return None;
        };

        let test = match engle_granger(s1, s2, self.config.lags) {
            Ok(test) => test,
            Err(e) => {
                warn!(first = %pair.first, second = %pair.second, error = %e, "cointegration test failed; pair skipped");
                return None;
            }
        };

        let accepted = test.pvalue < self.config.pvalue_threshold;
        if !accepted {
            debug!(
                first = %pair.first,
                second = %pair.second,
                pvalue = test.pvalue,
                "pair rejected"
            );
            return None;
        }

        let Some(hedge) = hedge_ratio(s1, s2) else {
            warn!(first = %pair.first, second = %pair.second, "hedge ratio undefined; pair skipped");
            return None;
        };
        let half_life = half_life(spread(s1, s2, hedge).view());

        debug!(
            first = %pair.first,
            second = %pair.second,
            pvalue = test.pvalue,
            hedge_ratio = hedge,
            half_life = ?half_life,
            "pair accepted"
        );

        Some(CointegrationResult {
            first: pair.first.clone(),
            second: pair.second.clone(),
            pvalue: test.pvalue,
            hedge_ratio: hedge,
            half_life,
            cluster: pair.cluster,
            statistic: test.statistic,
            critical_values: test.critical_values,
            nobs: test.nobs,
        })
    }

    /// Test candidates in order and keep the accepted ones, preserving the
    /// candidate order.
    pub fn test_pairs(&self, candidates: &[CandidatePair], levels: &PriceLevelPanel) -> PairTable {
        let decisions: Vec<Option<CointegrationResult>> = if self.config.parallel {
            candidates.par_iter().map(|pair| self.test_pair(pair, levels)).collect()
        } else {
            candidates.iter().map(|pair| self.test_pair(pair, levels)).collect()
        };

        let table: PairTable = decisions.into_iter().flatten().collect();
        info!(
            tested = candidates.len(),
            accepted = table.len(),
            pvalue_threshold = self.config.pvalue_threshold,
            "cointegration tests complete"
        );
        table
    }
}

/// Test candidates with a fixed residual lag of 1.
pub fn test_pairs(candidates: &[CandidatePair], levels: &PriceLevelPanel, pvalue_threshold: f64) -> PairTable {
    CointegrationTester::new(CointegrationConfig {
        pvalue_threshold,
        ..CointegrationConfig::default()
    })
    .test_pairs(candidates, levels)
}
