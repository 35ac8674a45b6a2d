//! Pipeline errors.

use tandem_cluster::ClusterError;
use thiserror::Error;

/// Fatal disagreement between the shapes of the pipeline inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputShapeError {
    /// The return panel has no instruments
    #[error("Empty universe: the return panel has no instruments")]
    NoInstruments,

    /// The return panel has no observations
    #[error("The return panel has no observations")]
    NoObservations,

    /// Return and price level panels list a different number of instruments
    #[error("Instrument count mismatch: return panel has {returns}, price level panel has {levels}")]
    InstrumentCountMismatch {
        /// Instruments in the return panel
        returns: usize,
        /// Instruments in the price level panel
        levels: usize,
    },

    /// Return and price level panels disagree on an instrument
    #[error("Instrument {index} differs: return panel has '{returns}', price level panel has '{levels}'")]
    InstrumentMismatch {
        /// Column index
        index: usize,
        /// Id in the return panel
        returns: String,
        /// Id in the price level panel
        levels: String,
    },

    /// An input's date index differs from the return panel's
    #[error("Date index of the {input} does not match the return panel")]
    DateMismatch {
        /// Which input disagreed
        input: &'static str,
    },

    /// A series or label vector has the wrong length
    #[error("{what} has length {actual}, expected {expected}")]
    LengthMismatch {
        /// What was measured
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },
}

/// Errors returned by the selection pipeline.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// Inputs are not aligned
    #[error(transparent)]
    InputShape(#[from] InputShapeError),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The clusterer rejected its input
    #[error("Clustering failed: {0}")]
    Cluster(#[from] ClusterError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, SelectionError>;
