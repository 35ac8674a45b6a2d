//! Ordinary least squares.

use crate::correlation::mean;
use crate::error::{Result, StatsError};
use crate::linalg::pseudo_inverse;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::f64::consts::PI;

/// Fitted OLS regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficients, one per design column
    pub params: Array1<f64>,
    /// Standard errors of the coefficients
    pub bse: Array1<f64>,
    /// Residuals `y - X b`
    pub resid: Array1<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Centered coefficient of determination
    pub rsquared: f64,
    /// Number of observations
    pub nobs: usize,
    /// Residual degrees of freedom
    pub df_resid: usize,
}

impl OlsFit {
    /// t-ratio of coefficient `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn tvalue(&self, index: usize) -> f64 {
        self.params[index] / self.bse[index]
    }

    /// Gaussian log-likelihood at the maximum likelihood variance.
    pub fn llf(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every coefficient.
    pub fn aic(&self) -> f64 {
        -2.0 * self.llf() + 2.0 * self.params.len() as f64
    }
}

/// Regress `y` on the columns of `x`.
///
/// The design is used as given; add a column of ones for an intercept.
///
/// # Errors
/// - [`StatsError::DimensionMismatch`] if `x` and `y` have different rows
/// - [`StatsError::InsufficientData`] without at least one residual degree
///   of freedom
/// - [`StatsError::SingularDesign`] if the columns are linearly dependent
pub fn ols(y: ArrayView1<'_, f64>, x: ArrayView2<'_, f64>) -> Result<OlsFit> {
    let (nobs, k) = x.dim();
    if y.len() != nobs {
        return Err(StatsError::DimensionMismatch {
            expected: nobs,
            actual: y.len(),
        });
    }
    if nobs <= k {
        return Err(StatsError::InsufficientData {
            required: k + 1,
            actual: nobs,
        });
    }

    let xtx = x.t().dot(&x);
    let (xtx_inv, rank) = pseudo_inverse(xtx.view())?;
    if rank < k {
        return Err(StatsError::SingularDesign { rank, columns: k });
    }

    let params = xtx_inv.dot(&x.t().dot(&y));
    let resid = &y - &x.dot(&params);
    let ssr = resid.dot(&resid);
    let df_resid = nobs - k;
    let scale = ssr / df_resid as f64;
    let bse = xtx_inv.diag().mapv(|v| (v * scale).max(0.0).sqrt());

    let y_mean = mean(y);
    let tss: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let rsquared = if tss > 0.0 { 1.0 - ssr / tss } else { 0.0 };

    Ok(OlsFit {
        params,
        bse,
        resid,
        ssr,
        rsquared,
        nobs,
        df_resid,
    })
}

/// Prepend a column of ones to a design.
pub fn add_constant(x: ArrayView2<'_, f64>) -> Array2<f64> {
    let mut design = Array2::<f64>::ones((x.nrows(), x.ncols() + 1));
    design.slice_mut(ndarray::s![.., 1..]).assign(&x);
    design
}

/// Straight line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Intercept
    pub intercept: f64,
    /// Slope
    pub slope: f64,
}

/// Least-squares line through `(x, y)`, the degree-one polynomial fit.
///
/// Returns `None` when the inputs differ in length, have fewer than two
/// points, `x` is constant, or the slope is not finite.
pub fn polyfit(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<LineFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let x_mean = mean(x);
    let y_mean = mean(y);
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        sxy += dx * (yi - y_mean);
        sxx += dx * dx;
    }
    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    if !slope.is_finite() {
        return None;
    }
    Some(LineFit {
        intercept: y_mean - slope * x_mean,
        slope,
    })
}

/// Stack series as the columns of a design matrix.
///
/// # Errors
/// Returns [`StatsError::DimensionMismatch`] if the lengths differ.
pub fn column_stack(columns: &[ArrayView1<'_, f64>]) -> Result<Array2<f64>> {
    if let Some(first) = columns.first() {
        if let Some(bad) = columns.iter().find(|c| c.len() != first.len()) {
            return Err(StatsError::DimensionMismatch {
                expected: first.len(),
                actual: bad.len(),
            });
        }
    }
    let views: Vec<_> = columns.iter().map(|c| c.view().insert_axis(Axis(1))).collect();
    ndarray::concatenate(Axis(1), &views).map_err(|_| StatsError::DimensionMismatch {
        expected: columns.len(),
        actual: 0,
    })
}
