#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tandem/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod load;

// Re-export main types from sub-crates
pub use tandem_cluster as cluster;
pub use tandem_data as data;
pub use tandem_output as output;
pub use tandem_select as select;
pub use tandem_stats as stats;

pub use load::{load_inputs, select_from_path};
pub use tandem_data::{PipelineInputs, PriceTable, ReturnKind};
pub use tandem_output::{ExportFormat, Exporter, PairReport};
pub use tandem_select::{PairSelector, PairTable, SelectionConfig, SelectionOutcome, select_pairs};

use thiserror::Error;

/// Any failure of loading inputs and running the selection.
#[derive(Debug, Error)]
pub enum Error {
    /// Input data could not be loaded.
    #[error(transparent)]
    Data(#[from] tandem_data::DataError),

    /// The selection pipeline rejected its inputs or configuration.
    #[error(transparent)]
    Selection(#[from] tandem_select::SelectionError),
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
