#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tandem/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod optics;

pub use error::ClusterError;
pub use optics::{Extraction, Optics, OpticsConfig, OpticsModel};

use ndarray::ArrayView2;

/// Label of a point that belongs to no cluster.
pub const NOISE: i64 = -1;

/// One label per input point; [`NOISE`] or a non-negative cluster id.
pub type Labels = Vec<i64>;

/// Clustering of points from a precomputed, symmetric distance matrix.
pub trait DensityClusterer {
    /// Assign a label to every row of `distances`.
    ///
    /// # Errors
    /// Returns a [`ClusterError`] if the matrix is not square, contains
    /// negative or non-finite entries, or the configuration is invalid.
    fn fit_predict(&self, distances: ArrayView2<'_, f64>) -> Result<Labels, ClusterError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Check that `distances` is a square matrix of finite, non-negative values.
///
/// # Errors
/// See [`DensityClusterer::fit_predict`].
pub fn validate_distances(distances: ArrayView2<'_, f64>) -> Result<(), ClusterError> {
    let (rows, cols) = distances.dim();
    if rows != cols {
        return Err(ClusterError::NotSquare { rows, cols });
    }
    for ((row, col), &value) in distances.indexed_iter() {
        if !value.is_finite() || value < 0.0 {
            return Err(ClusterError::InvalidDistance { row, col, value });
        }
    }
    Ok(())
}
