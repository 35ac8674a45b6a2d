//! Dated panels of instrument series.
//!
//! A panel is an `observations x instruments` matrix with a strictly
//! increasing date index. The kind marker distinguishes return panels from
//! price-level panels at the type level; both share one representation.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for the contents of a [`Panel`].
pub trait PanelKind: fmt::Debug + Clone + Copy + Send + Sync + 'static {
    /// Human-readable label used in error messages and logs.
    const LABEL: &'static str;
}

/// Period returns (percentage, simple or log).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Returns;

impl PanelKind for Returns {
    const LABEL: &'static str = "return panel";
}

/// Raw, non-differenced price or index levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Levels;

impl PanelKind for Levels {
    const LABEL: &'static str = "price level panel";
}

/// Return panel consumed by the distance computation.
pub type ReturnPanel = Panel<Returns>;

/// Price-level panel consumed by the cointegration tests.
pub type PriceLevelPanel = Panel<Levels>;

/// Dated rows by instrument columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel<K: PanelKind> {
    dates: Vec<NaiveDate>,
    instruments: Vec<String>,
    values: Array2<f64>,
    kind: PhantomData<K>,
}

impl<K: PanelKind> Panel<K> {
    /// Create a panel from a date index, instrument ids and a
    /// `dates.len() x instruments.len()` value matrix.
    ///
    /// # Errors
    /// Fails on shape mismatch, duplicate instruments, unordered dates or
    /// non-finite values.
    pub fn new(dates: Vec<NaiveDate>, instruments: Vec<String>, values: Array2<f64>) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows != dates.len() {
            return Err(DataError::DimensionMismatch {
                axis: "observations",
                expected: dates.len(),
                actual: rows,
            });
        }
        if cols != instruments.len() {
            return Err(DataError::DimensionMismatch {
                axis: "instruments",
                expected: instruments.len(),
                actual: cols,
            });
        }

        validate_dates(&dates)?;

        let mut seen = HashSet::with_capacity(instruments.len());
        for instrument in &instruments {
            if !seen.insert(instrument.as_str()) {
                return Err(DataError::DuplicateInstrument(instrument.clone()));
            }
        }

        for ((row, col), value) in values.indexed_iter() {
            if !value.is_finite() {
                return Err(DataError::NonFinite {
                    series: instruments[col].clone(),
                    date: dates[row],
                });
            }
        }

        Ok(Self {
            dates,
            instruments,
            values,
            kind: PhantomData,
        })
    }

    /// Create a panel from named columns of equal length.
    ///
    /// # Errors
    /// Same conditions as [`Panel::new`].
    pub fn from_columns(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let n_obs = dates.len();
        let mut values = Array2::<f64>::zeros((n_obs, columns.len()));
        let mut instruments = Vec::with_capacity(columns.len());

        for (j, (name, series)) in columns.into_iter().enumerate() {
            if series.len() != n_obs {
                return Err(DataError::DimensionMismatch {
                    axis: "observations",
                    expected: n_obs,
                    actual: series.len(),
                });
            }
            values.column_mut(j).assign(&Array1::from_vec(series));
            instruments.push(name);
        }

        Self::new(dates, instruments, values)
    }

    /// Date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Instrument ids in column order.
    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Value matrix (observations x instruments).
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Number of dated rows.
    pub fn n_observations(&self) -> usize {
        self.dates.len()
    }

    /// Number of instrument columns.
    pub fn n_instruments(&self) -> usize {
        self.instruments.len()
    }

    /// True when the panel has no instruments or no observations.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.instruments.is_empty()
    }

    /// Column index of an instrument.
    pub fn position(&self, instrument: &str) -> Option<usize> {
        self.instruments.iter().position(|i| i == instrument)
    }

    /// Series of the instrument at column `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.column(index)
    }

    /// Series of an instrument by id.
    pub fn series(&self, instrument: &str) -> Option<ArrayView1<'_, f64>> {
        self.position(instrument).map(|j| self.values.column(j))
    }

    /// Panel without its first `n` observations.
    pub fn skip_observations(&self, n: usize) -> Self {
        let n = n.min(self.dates.len());
        Self {
            dates: self.dates[n..].to_vec(),
            instruments: self.instruments.clone(),
            values: self.values.slice(s![n.., ..]).to_owned(),
            kind: PhantomData,
        }
    }

    pub(crate) fn from_parts_unchecked(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        values: Array2<f64>,
    ) -> Self {
        Self {
            dates,
            instruments,
            values,
            kind: PhantomData,
        }
    }
}

/// Single dated series of the common market factor.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketFactorSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Array1<f64>,
}

impl MarketFactorSeries {
    /// Create a market series.
    ///
    /// # Errors
    /// Fails on length mismatch, unordered dates or non-finite values.
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Array1<f64>) -> Result<Self> {
        let name = name.into();
        if values.len() != dates.len() {
            return Err(DataError::DimensionMismatch {
                axis: "observations",
                expected: dates.len(),
                actual: values.len(),
            });
        }
        validate_dates(&dates)?;
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataError::NonFinite {
                series: name,
                date: dates[row],
            });
        }
        Ok(Self {
            name,
            dates,
            values,
        })
    }

    /// Series name (e.g. the index ticker).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observations.
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) const fn from_parts_unchecked(
        name: String,
        dates: Vec<NaiveDate>,
        values: Array1<f64>,
    ) -> Self {
        Self {
            name,
            dates,
            values,
        }
    }
}

fn validate_dates(dates: &[NaiveDate]) -> Result<()> {
    for pair in dates.windows(2) {
        if pair[1] <= pair[0] {
            return Err(DataError::UnorderedDates {
                previous: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}
