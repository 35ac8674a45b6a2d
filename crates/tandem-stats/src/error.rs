//! Error types for statistical routines.

use crate::adf::Deterministic;
use thiserror::Error;

/// Result type for statistical routines.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors raised by the estimators in this crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    /// Not enough observations for the requested fit
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum number of observations
        required: usize,
        /// Observations available
        actual: usize,
    },

    /// Input lengths or shapes disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// The design matrix does not have full column rank
    #[error("Singular design matrix: rank {rank} of {columns} columns")]
    SingularDesign {
        /// Numerical rank
        rank: usize,
        /// Number of regressors
        columns: usize,
    },

    /// No response surface is tabulated for this case
    #[error("No MacKinnon table for deterministic terms '{deterministic}' with {n_vars} variable(s)")]
    UnsupportedTable {
        /// Deterministic terms of the test regression
        deterministic: Deterministic,
        /// Number of variables in the (co)integrating system
        n_vars: usize,
    },
}
