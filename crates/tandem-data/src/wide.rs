//! Wide CSV price tables.
//!
//! The first column holds `YYYY-MM-DD` dates; every other column is one
//! series of price levels. Cells are never imputed: an empty or non-numeric
//! cell rejects the file with its line number.

use crate::error::{DataError, Result};
use crate::panel::{MarketFactorSeries, PriceLevelPanel};
use chrono::NaiveDate;
use ndarray::Array2;
use std::io;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Price levels read from a wide CSV, before any column is singled out as
/// the market factor.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    names: Vec<String>,
    values: Array2<f64>,
}

impl PriceTable {
    /// Parse a table from any reader.
    ///
    /// # Errors
    /// - [`DataError::Csv`] on malformed CSV, including rows of the wrong width
    /// - [`DataError::InvalidDate`] / [`DataError::InvalidCell`] on unparseable
    ///   or empty cells
    /// - [`DataError::MissingColumn`] when there is no series column
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let header = csv.headers()?.clone();
        let names: Vec<String> = header.iter().skip(1).map(str::to_string).collect();
        if names.is_empty() {
            return Err(DataError::MissingColumn("at least one price column".to_string()));
        }

        let mut dates = Vec::new();
        let mut cells = Vec::new();
        for record in csv.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);

            let raw_date = record.get(0).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| DataError::InvalidDate {
                line,
                value: raw_date.to_string(),
            })?;
            dates.push(date);

            for (name, raw) in names.iter().zip(record.iter().skip(1)) {
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| DataError::InvalidCell {
                        line,
                        column: name.clone(),
                        value: raw.to_string(),
                    })?;
                cells.push(value);
            }
        }

        let n_cells = cells.len();
        let values = Array2::from_shape_vec((dates.len(), names.len()), cells).map_err(|_| {
            DataError::DimensionMismatch {
                axis: "cells",
                expected: dates.len() * names.len(),
                actual: n_cells,
            }
        })?;
        Ok(Self { dates, names, values })
    }

    /// Read a table from a file.
    ///
    /// # Errors
    /// [`DataError::Io`] when the file cannot be opened, otherwise as
    /// [`PriceTable::from_reader`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Row dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column names after the date column.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of rows.
    pub fn n_observations(&self) -> usize {
        self.dates.len()
    }

    /// Every column as a price level panel.
    ///
    /// # Errors
    /// Any [`PriceLevelPanel::new`] validation error.
    pub fn into_levels(self) -> Result<PriceLevelPanel> {
        PriceLevelPanel::new(self.dates, self.names, self.values)
    }

    /// Split off the `market` column; the remaining columns form the panel.
    ///
    /// # Errors
    /// [`DataError::MissingColumn`] when `market` is not a column, or any
    /// panel validation error.
    pub fn split_market(self, market: &str) -> Result<(PriceLevelPanel, MarketFactorSeries)> {
        let index = self
            .names
            .iter()
            .position(|name| name == market)
            .ok_or_else(|| DataError::MissingColumn(market.to_string()))?;

        let market_series = MarketFactorSeries::new(market, self.dates.clone(), self.values.column(index).to_owned())?;

        let keep: Vec<usize> = (0..self.names.len()).filter(|&j| j != index).collect();
        let names = keep.iter().map(|&j| self.names[j].clone()).collect();
        let values = self.values.select(ndarray::Axis(1), &keep);
        let panel = PriceLevelPanel::new(self.dates, names, values)?;

        Ok((panel, market_series))
    }
}
