//! Polars interop.
//!
//! Frames carry one `Date` column plus one numeric column per instrument.

use crate::error::{DataError, Result};
use crate::panel::{MarketFactorSeries, Panel, PanelKind};
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use polars::prelude::*;

fn frame_dates(df: &DataFrame, date_column: &str) -> Result<Vec<NaiveDate>> {
    let column = df
        .column(date_column)
        .map_err(|_| DataError::MissingColumn(date_column.to_string()))?;
    let dates = column.as_materialized_series().date()?;
    dates
        .as_date_iter()
        .map(|d| d.ok_or_else(|| DataError::MissingColumn(format!("{date_column} (null date)"))))
        .collect()
}

fn frame_values(df: &DataFrame, name: &str, dates: &[NaiveDate]) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;
    let cast = column.as_materialized_series().cast(&DataType::Float64)?;
    cast.f64()?
        .into_iter()
        .zip(dates)
        .map(|(value, date)| {
            value.ok_or_else(|| DataError::NonFinite {
                series: name.to_string(),
                date: *date,
            })
        })
        .collect()
}

impl<K: PanelKind> Panel<K> {
    /// Build a panel from a frame; every column other than `date_column` is
    /// an instrument.
    ///
    /// # Errors
    /// Fails when the date column is missing or not a `Date`, when a value is
    /// null, or on any [`Panel::new`] validation error.
    pub fn from_frame(df: &DataFrame, date_column: &str) -> Result<Self> {
        let dates = frame_dates(df, date_column)?;
        let instruments: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != date_column)
            .map(|name| name.to_string())
            .collect();

        let mut values = Array2::<f64>::zeros((dates.len(), instruments.len()));
        for (j, name) in instruments.iter().enumerate() {
            let series = frame_values(df, name, &dates)?;
            values.column_mut(j).assign(&Array1::from_vec(series));
        }

        Self::new(dates, instruments, values)
    }
}

impl MarketFactorSeries {
    /// Build a market series from one column of a frame.
    ///
    /// # Errors
    /// Fails when a column is missing, a value is null, or validation fails.
    pub fn from_frame(df: &DataFrame, date_column: &str, value_column: &str) -> Result<Self> {
        let dates = frame_dates(df, date_column)?;
        let values = frame_values(df, value_column, &dates)?;
        Self::new(value_column, dates, Array1::from_vec(values))
    }
}
