#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tandem/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod frame;
pub mod report;

pub use export::{AssignmentRow, ExportError, ExportFormat, Exporter, PairRow, pair_rows};
pub use frame::{assignment_frame, pair_table_frame};
pub use report::{ClusterSummary, PairReport, ReportError, SelectionSummary};
