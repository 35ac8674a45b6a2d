//! Error types for panel construction.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while building or transforming panels.
#[derive(Debug, Error)]
pub enum DataError {
    /// Value matrix does not match the date index or instrument list
    #[error("Dimension mismatch for {axis}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which axis disagreed ("observations" or "instruments")
        axis: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// The same instrument id appears twice
    #[error("Duplicate instrument: {0}")]
    DuplicateInstrument(String),

    /// Dates are not strictly increasing
    #[error("Dates must be strictly increasing: {next} follows {previous}")]
    UnorderedDates {
        /// Earlier row's date
        previous: NaiveDate,
        /// Offending row's date
        next: NaiveDate,
    },

    /// A missing, infinite or NaN value
    #[error("Non-finite value for {series} on {date}")]
    NonFinite {
        /// Instrument or series name
        series: String,
        /// Date of the offending observation
        date: NaiveDate,
    },

    /// Two inputs that must share a date index do not
    #[error("Date index of {left} does not match {right}")]
    DateIndexMismatch {
        /// First input
        left: String,
        /// Second input
        right: String,
    },

    /// A required frame column is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A date cell that is not `YYYY-MM-DD`
    #[error("Line {line}: invalid date '{value}'")]
    InvalidDate {
        /// 1-based line number
        line: u64,
        /// Raw cell
        value: String,
    },

    /// An empty, non-numeric or non-finite price cell
    #[error("Line {line}: invalid value '{value}' in column {column}")]
    InvalidCell {
        /// 1-based line number
        line: u64,
        /// Column header
        column: String,
        /// Raw cell
        value: String,
    },

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
