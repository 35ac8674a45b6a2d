#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tandem/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod clusters;
pub mod cointegration;
pub mod config;
pub mod distance;
pub mod error;
pub mod pairs;
pub mod pipeline;
pub mod table;

pub use clusters::{Cluster, ClusterAssignment, cluster, cluster_with};
pub use cointegration::{
    CointegrationConfig, CointegrationResult, CointegrationTester, half_life, hedge_ratio, spread,
    test_pairs,
};
pub use config::{DEFAULT_MAX_EPS, SelectionConfig};
pub use distance::{DistanceEngine, DistanceMatrix, compute_distance};
pub use error::{InputShapeError, Result, SelectionError};
pub use pairs::{CandidatePair, generate_pairs};
pub use pipeline::{PairSelector, SelectionOutcome, check_inputs, select_pairs};
pub use table::PairTable;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
