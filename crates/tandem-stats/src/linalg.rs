//! Symmetric eigendecomposition and the pseudo-inverse built on it.
//!
//! Regression designs in this crate have a handful of columns, so the cyclic
//! Jacobi method on the normal-equations matrix is accurate and fast enough.

use crate::error::{Result, StatsError};
use ndarray::{Array1, Array2, ArrayView2};

/// Relative eigenvalue cutoff used by [`pseudo_inverse`].
pub const PINV_RCOND: f64 = 1e-12;

const JACOBI_MAX_SWEEPS: usize = 100;

/// Eigenvalues and eigenvectors of a symmetric matrix.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues, descending
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors as columns, in eigenvalue order
    pub eigenvectors: Array2<f64>,
}

/// Jacobi eigendecomposition of a symmetric matrix.
///
/// Rotates away the largest off-diagonal element until every off-diagonal
/// element is negligible relative to the diagonal.
///
/// # Errors
/// Returns [`StatsError::DimensionMismatch`] if the matrix is not square.
pub fn symmetric_eigen(matrix: ArrayView2<'_, f64>) -> Result<EigenDecomposition> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(StatsError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }

    let mut a = matrix.to_owned();
    let mut v = Array2::<f64>::eye(n);

    if n > 1 {
        let scale = a.diag().iter().fold(0.0_f64, |acc, d| acc.max(d.abs())).max(f64::MIN_POSITIVE);
        let tolerance = scale * f64::EPSILON;
        let max_rotations = JACOBI_MAX_SWEEPS * n * n;

        for _ in 0..max_rotations {
            let (p, q) = largest_off_diagonal(&a);
            if a[[p, q]].abs() <= tolerance {
                break;
            }
            let (c, s) = rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
            rotate(&mut a, &mut v, p, q, c, s);
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let eigenvalues = order.iter().map(|&i| a[[i, i]]).collect();
    let mut eigenvectors = Array2::<f64>::zeros((n, n));
    for (k, &i) in order.iter().enumerate() {
        eigenvectors.column_mut(k).assign(&v.column(i));
    }

    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
    })
}

/// Moore-Penrose pseudo-inverse of a symmetric positive semi-definite
/// matrix, together with its numerical rank.
///
/// Eigenvalues below `PINV_RCOND` times the largest one are treated as zero.
///
/// # Errors
/// Returns [`StatsError::DimensionMismatch`] if the matrix is not square.
pub fn pseudo_inverse(matrix: ArrayView2<'_, f64>) -> Result<(Array2<f64>, usize)> {
    let n = matrix.nrows();
    let decomp = symmetric_eigen(matrix)?;
    let largest = decomp.eigenvalues.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let cutoff = largest * PINV_RCOND;

    let mut inverse = Array2::<f64>::zeros((n, n));
    let mut rank = 0;
    for (k, &lambda) in decomp.eigenvalues.iter().enumerate() {
        if lambda <= cutoff || lambda <= 0.0 {
            continue;
        }
        rank += 1;
        let column = decomp.eigenvectors.column(k);
        for i in 0..n {
            for j in 0..n {
                inverse[[i, j]] += column[i] * column[j] / lambda;
            }
        }
    }

    Ok((inverse, rank))
}

fn largest_off_diagonal(a: &Array2<f64>) -> (usize, usize) {
    let n = a.nrows();
    let (mut p, mut q, mut largest) = (0, 1, -1.0);
    for i in 0..n {
        for j in (i + 1)..n {
            let value = a[[i, j]].abs();
            if value > largest {
                largest = value;
                p = i;
                q = j;
            }
        }
    }
    (p, q)
}

fn rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    let tau = (aqq - app) / (2.0 * apq);
    let t = if tau >= 0.0 {
        1.0 / (tau + (1.0 + tau * tau).sqrt())
    } else {
        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
    };
    let c = 1.0 / (1.0 + t * t).sqrt();
    (c, t * c)
}

fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    let n = a.nrows();
    let (app, aqq, apq) = (a[[p, p]], a[[q, q]], a[[p, q]]);

    a[[p, p]] = c * c * app - 2.0 * c * s * apq + s * s * aqq;
    a[[q, q]] = s * s * app + 2.0 * c * s * apq + c * c * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for i in 0..n {
        if i == p || i == q {
            continue;
        }
        let (aip, aiq) = (a[[i, p]], a[[i, q]]);
        a[[i, p]] = c * aip - s * aiq;
        a[[p, i]] = a[[i, p]];
        a[[i, q]] = s * aip + c * aiq;
        a[[q, i]] = a[[i, q]];
    }

    for i in 0..n {
        let (vip, viq) = (v[[i, p]], v[[i, q]]);
        v[[i, p]] = c * vip - s * viq;
        v[[i, q]] = s * vip + c * viq;
    }
}
