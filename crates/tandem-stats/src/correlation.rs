//! Pearson and partial correlation.
//!
//! All moments are population moments (divide by `n`), which leaves the
//! correlation unchanged and keeps the zero-variance checks scale-free of
//! the degrees-of-freedom convention.

use crate::error::{Result, StatsError};
use ndarray::{Array1, ArrayView1};

/// Standard deviation at or below which a series is treated as constant.
pub const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

/// Partial-correlation denominator at or below which the partial
/// correlation is defined as zero.
pub const PARTIAL_DENOMINATOR_TOLERANCE: f64 = 1e-12;

/// Arithmetic mean; zero for an empty series.
pub fn mean(x: ArrayView1<'_, f64>) -> f64 {
    x.mean().unwrap_or(0.0)
}

/// Population standard deviation; zero for an empty series.
pub fn population_std(x: ArrayView1<'_, f64>) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.std(0.0)
}

/// Whether a series is numerically constant.
pub fn is_degenerate(x: ArrayView1<'_, f64>) -> bool {
    population_std(x) <= ZERO_VARIANCE_TOLERANCE
}

/// Z-scores of a series, or `None` when it is numerically constant.
///
/// The correlation of two standardized series of length `n` is their dot
/// product divided by `n`.
pub fn standardize(x: ArrayView1<'_, f64>) -> Option<Array1<f64>> {
    let sd = population_std(x);
    if sd <= ZERO_VARIANCE_TOLERANCE {
        return None;
    }
    let mu = mean(x);
    Some(x.mapv(|v| (v - mu) / sd))
}

/// Correlation of two standardized series; zero when either is degenerate.
pub fn correlation_of_standardized(
    x: Option<&Array1<f64>>,
    y: Option<&Array1<f64>>,
) -> f64 {
    match (x, y) {
        (Some(x), Some(y)) if !x.is_empty() => {
            let r = x.dot(y) / x.len() as f64;
            r.clamp(-1.0, 1.0)
        }
        _ => 0.0,
    }
}

/// Pearson correlation coefficient.
///
/// A numerically constant input has no defined correlation; it is reported
/// as `0.0`.
///
/// # Errors
/// Returns [`StatsError::DimensionMismatch`] if the lengths differ.
pub fn pearson(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Result<f64> {
    if x.len() != y.len() {
        return Err(StatsError::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    Ok(correlation_of_standardized(
        standardize(x).as_ref(),
        standardize(y).as_ref(),
    ))
}

/// First-order partial correlation of x and y given m, from the three
/// pairwise correlations.
///
/// Returns `None` when `sqrt((1 - r_xm^2)(1 - r_ym^2))` is at or below
/// [`PARTIAL_DENOMINATOR_TOLERANCE`], i.e. when x or y is collinear with m.
/// The result is clamped to `[-1, 1]`.
pub fn partial_correlation(r_xy: f64, r_xm: f64, r_ym: f64) -> Option<f64> {
    let denominator = ((1.0 - r_xm * r_xm) * (1.0 - r_ym * r_ym)).max(0.0).sqrt();
    if denominator <= PARTIAL_DENOMINATOR_TOLERANCE || !denominator.is_finite() {
        return None;
    }
    Some(((r_xy - r_xm * r_ym) / denominator).clamp(-1.0, 1.0))
}
