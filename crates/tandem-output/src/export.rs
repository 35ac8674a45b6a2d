//! CSV and JSON export of pair tables and cluster assignments.
//!
//! JSON keeps the nested shape of the results; CSV flattens each accepted
//! pair into one row. An undefined half-life is `null` in JSON and an empty
//! field in CSV.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tandem_select::{ClusterAssignment, CointegrationResult, PairTable};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer produced invalid UTF-8.
    #[error("Invalid UTF-8 in CSV output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One accepted pair as a flat record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairRow {
    /// First instrument.
    pub first: String,
    /// Second instrument.
    pub second: String,
    /// Engle-Granger p-value.
    pub pvalue: f64,
    /// Hedge ratio of `second` on `first`.
    pub hedge_ratio: f64,
    /// Spread half-life, empty when undefined.
    pub half_life: Option<f64>,
    /// Cluster label.
    pub cluster: i64,
    /// Engle-Granger statistic.
    pub statistic: f64,
    /// 1% critical value.
    pub critical_1pct: f64,
    /// 5% critical value.
    pub critical_5pct: f64,
    /// 10% critical value.
    pub critical_10pct: f64,
    /// Observations used.
    pub nobs: usize,
}

impl From<&CointegrationResult> for PairRow {
    fn from(result: &CointegrationResult) -> Self {
        Self {
            first: result.first.clone(),
            second: result.second.clone(),
            pvalue: result.pvalue,
            hedge_ratio: result.hedge_ratio,
            half_life: result.half_life,
            cluster: result.cluster,
            statistic: result.statistic,
            critical_1pct: result.critical_values.one_percent,
            critical_5pct: result.critical_values.five_percent,
            critical_10pct: result.critical_values.ten_percent,
            nobs: result.nobs,
        }
    }
}

/// Flat rows of a pair table, in table order.
pub fn pair_rows(table: &PairTable) -> Vec<PairRow> {
    table.iter().map(PairRow::from).collect()
}

/// One instrument's cluster label as a flat record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentRow {
    /// Instrument id.
    pub instrument: String,
    /// Cluster label, `-1` for noise.
    pub label: i64,
}

fn assignment_rows(assignment: &ClusterAssignment) -> Vec<AssignmentRow> {
    assignment
        .iter()
        .map(|(instrument, label)| AssignmentRow {
            instrument: instrument.to_string(),
            label,
        })
        .collect()
}

/// Serialize records to CSV with a header row. An empty input still gets
/// the header when `header` is given.
fn write_csv<T: Serialize>(records: &[T], header: &[&str]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(!records.is_empty()).from_writer(vec![]);
    if records.is_empty() {
        wtr.write_record(header)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

const PAIR_HEADER: [&str; 11] = [
    "first",
    "second",
    "pvalue",
    "hedge_ratio",
    "half_life",
    "cluster",
    "statistic",
    "critical_1pct",
    "critical_5pct",
    "critical_10pct",
    "nobs",
];

const ASSIGNMENT_HEADER: [&str; 2] = ["instrument", "label"];

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for PairTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(&pair_rows(self), &PAIR_HEADER),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for ClusterAssignment {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rows = assignment_rows(self);
        match format {
            ExportFormat::Csv => write_csv(&rows, &ASSIGNMENT_HEADER),
            ExportFormat::Json => Ok(serde_json::to_string(&rows)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&rows)?),
        }
    }
}
