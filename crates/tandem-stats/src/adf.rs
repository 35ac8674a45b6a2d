//! Augmented Dickey-Fuller unit-root test.
//!
//! The test regression for lag order `p` is
//!
//! ```text
//! dx_t = g * x_{t-1} + a_1 dx_{t-1} + ... + a_p dx_{t-p} + deterministic terms + e_t
//! ```
//!
//! and the statistic is the t-ratio of `g`. With `n` levels the regression
//! uses `n - p - 1` observations.

use crate::error::{Result, StatsError};
use crate::mackinnon::{CriticalValues, mackinnon_critical_values, mackinnon_pvalue};
use crate::regression::{OlsFit, ols};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic terms in a test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Deterministic {
    /// No constant, no trend
    #[serde(rename = "n")]
    None,
    /// Constant only
    #[serde(rename = "c")]
    Constant,
    /// Constant and linear trend
    #[serde(rename = "ct")]
    ConstantTrend,
}

impl Deterministic {
    const fn n_terms(self) -> usize {
        match self {
            Self::None => 0,
            Self::Constant => 1,
            Self::ConstantTrend => 2,
        }
    }
}

impl fmt::Display for Deterministic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::None => "n",
            Self::Constant => "c",
            Self::ConstantTrend => "ct",
        };
        f.write_str(code)
    }
}

/// How many lagged differences enter the test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagSelection {
    /// Exactly this many lags
    Fixed(usize),
    /// Minimise AIC over `0..=max_lag` on a common sample, then refit
    Aic {
        /// Largest lag considered
        max_lag: usize,
    },
}

impl Default for LagSelection {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

/// ADF test settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdfConfig {
    /// Deterministic terms
    pub deterministic: Deterministic,
    /// Lag policy
    pub lags: LagSelection,
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self {
            deterministic: Deterministic::Constant,
            lags: LagSelection::default(),
        }
    }
}

/// Test statistic of an ADF regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfStatistic {
    /// t-ratio of the lagged level
    pub statistic: f64,
    /// Lag order actually used
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
}

/// Full ADF test outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    /// t-ratio of the lagged level
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub pvalue: f64,
    /// Critical values for the regression's sample size
    pub critical_values: CriticalValues,
    /// Lag order actually used
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
}

/// Build the test regression for `lag` lagged differences, using the
/// differences from index `start` onwards (`start >= lag`).
fn design(
    x: ArrayView1<'_, f64>,
    lag: usize,
    start: usize,
    deterministic: Deterministic,
) -> Result<(Array1<f64>, Array2<f64>)> {
    let n = x.len();
    let k = 1 + lag + deterministic.n_terms();
    if n < start + 2 {
        return Err(StatsError::InsufficientData {
            required: start + k + 2,
            actual: n,
        });
    }

    let nobs = n - 1 - start;
    let mut y = Array1::<f64>::zeros(nobs);
    let mut design = Array2::<f64>::zeros((nobs, k));

    for row in 0..nobs {
        let t = start + row;
        y[row] = x[t + 1] - x[t];
        design[[row, 0]] = x[t];
        for j in 1..=lag {
            design[[row, j]] = x[t + 1 - j] - x[t - j];
        }
        match deterministic {
            Deterministic::None => {}
            Deterministic::Constant => design[[row, lag + 1]] = 1.0,
            Deterministic::ConstantTrend => {
                design[[row, lag + 1]] = 1.0;
                design[[row, lag + 2]] = (row + 1) as f64;
            }
        }
    }

    Ok((y, design))
}

fn fit(x: ArrayView1<'_, f64>, lag: usize, start: usize, deterministic: Deterministic) -> Result<OlsFit> {
    let (y, design) = design(x, lag, start, deterministic)?;
    ols(y.view(), design.view())
}

/// ADF statistic of a series without a p-value lookup.
///
/// # Errors
/// Fails when the series is too short for the requested lag order or the
/// regression is singular.
pub fn adf_statistic(
    x: ArrayView1<'_, f64>,
    deterministic: Deterministic,
    lags: LagSelection,
) -> Result<AdfStatistic> {
    let used_lag = match lags {
        LagSelection::Fixed(lag) => lag,
        LagSelection::Aic { max_lag } => {
            let mut best: Option<(f64, usize)> = None;
            for lag in 0..=max_lag {
                let aic = fit(x, lag, max_lag, deterministic)?.aic();
                if best.is_none_or(|(best_aic, _)| aic < best_aic) {
                    best = Some((aic, lag));
                }
            }
            best.map_or(0, |(_, lag)| lag)
        }
    };

    let result = fit(x, used_lag, used_lag, deterministic)?;
    Ok(AdfStatistic {
        statistic: result.tvalue(0),
        used_lag,
        nobs: result.nobs,
    })
}

/// Augmented Dickey-Fuller test of a single series.
///
/// # Errors
/// Fails as [`adf_statistic`] does, or when no MacKinnon table covers the
/// deterministic terms.
pub fn adf(x: ArrayView1<'_, f64>, config: &AdfConfig) -> Result<AdfResult> {
    let stat = adf_statistic(x, config.deterministic, config.lags)?;
    Ok(AdfResult {
        statistic: stat.statistic,
        pvalue: mackinnon_pvalue(stat.statistic, config.deterministic, 1)?,
        critical_values: mackinnon_critical_values(config.deterministic, 1, Some(stat.nobs))?,
        used_lag: stat.used_lag,
        nobs: stat.nobs,
    })
}
