//! Clustering errors.

use thiserror::Error;

/// Errors raised while validating input or configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClusterError {
    /// The distance matrix is not square
    #[error("Distance matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Rows
        rows: usize,
        /// Columns
        cols: usize,
    },

    /// A distance is negative, NaN or infinite
    #[error("Invalid distance {value} at ({row}, {col})")]
    InvalidDistance {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Offending value
        value: f64,
    },

    /// A configuration parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
