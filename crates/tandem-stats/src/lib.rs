#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tandem/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod adf;
pub mod correlation;
pub mod engle_granger;
pub mod error;
pub mod linalg;
pub mod mackinnon;
pub mod regression;

pub use adf::{AdfConfig, AdfResult, Deterministic, LagSelection, adf};
pub use correlation::{
    PARTIAL_DENOMINATOR_TOLERANCE, ZERO_VARIANCE_TOLERANCE, partial_correlation, pearson,
};
pub use engle_granger::{EngleGrangerResult, engle_granger};
pub use error::{Result, StatsError};
pub use mackinnon::{CriticalValues, mackinnon_critical_values, mackinnon_pvalue};
pub use regression::{LineFit, OlsFit, ols, polyfit};
