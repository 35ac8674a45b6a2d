#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tandem/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod frame;
pub mod panel;
pub mod returns;
pub mod wide;

pub use error::{DataError, Result};
pub use panel::{Levels, MarketFactorSeries, Panel, PanelKind, PriceLevelPanel, ReturnPanel, Returns};
pub use returns::{PipelineInputs, ReturnKind};
pub use wide::PriceTable;

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
