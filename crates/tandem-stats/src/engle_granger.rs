//! Engle-Granger two-step cointegration test.

use crate::adf::{Deterministic, LagSelection, adf_statistic};
use crate::error::{Result, StatsError};
use crate::mackinnon::{CriticalValues, mackinnon_critical_values, mackinnon_pvalue};
use crate::regression::{add_constant, ols};
use ndarray::ArrayView1;
use tracing::warn;

/// R² at or above which the cointegrating regression is treated as a
/// perfect fit, `1 - 100 * sqrt(machine epsilon)`.
pub fn collinearity_rsquared() -> f64 {
    1.0 - 100.0 * f64::EPSILON.sqrt()
}

/// Outcome of an Engle-Granger test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngleGrangerResult {
    /// ADF t-ratio on the cointegrating residuals; `-inf` for a perfect fit
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub pvalue: f64,
    /// MacKinnon (2010) critical values
    pub critical_values: CriticalValues,
    /// Length of the input series
    pub nobs: usize,
    /// Lag order of the residual ADF regression; `None` for a perfect fit
    pub used_lag: Option<usize>,
}

/// Test whether `y0` and `y1` are cointegrated.
///
/// Step one regresses `y0` on a constant and `y1`; step two runs an ADF
/// regression without deterministic terms on the residuals. The p-value
/// and critical values use the two-variable constant-case surfaces.
///
/// # Errors
/// Fails when the series differ in length, are too short for the residual
/// regression, or the design is singular.
pub fn engle_granger(
    y0: ArrayView1<'_, f64>,
    y1: ArrayView1<'_, f64>,
    lags: LagSelection,
) -> Result<EngleGrangerResult> {
    if y0.len() != y1.len() {
        return Err(StatsError::DimensionMismatch {
            expected: y0.len(),
            actual: y1.len(),
        });
    }

    let nobs = y0.len();
    let design = add_constant(y1.insert_axis(ndarray::Axis(1)));
    let cointegrating = ols(y0, design.view())?;
    let critical_values =
        mackinnon_critical_values(Deterministic::Constant, 2, Some(nobs.saturating_sub(1)))?;

    if cointegrating.rsquared >= collinearity_rsquared() {
        warn!(
            nobs,
            rsquared = cointegrating.rsquared,
            "series are (almost) perfectly collinear; cointegration test is not meaningful"
        );
        return Ok(EngleGrangerResult {
            statistic: f64::NEG_INFINITY,
            pvalue: 0.0,
            critical_values,
            nobs,
            used_lag: None,
        });
    }

    let residual_test = adf_statistic(cointegrating.resid.view(), Deterministic::None, lags)?;
    let pvalue = mackinnon_pvalue(residual_test.statistic, Deterministic::Constant, 2)?;

    Ok(EngleGrangerResult {
        statistic: residual_test.statistic,
        pvalue,
        critical_values,
        nobs,
        used_lag: Some(residual_test.used_lag),
    })
}
