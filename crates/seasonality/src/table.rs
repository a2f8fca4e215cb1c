//! Per-year result tables.
//!
//! Every aggregation produces a [`YearTable`]: one column per included year,
//! one row per calendar key (day slot or month), an optional cross-year mean,
//! and the list of years that were left out and why.

use crate::{
    Result, SeasonalityError,
    calendar::{CalendarDay, Month},
    series::f64_values,
};
use derive_more::Display;
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::warn;

const MEAN: &str = "mean";

/// Row key of a [`YearTable`].
pub trait RowKey: Copy + Ord + fmt::Display + fmt::Debug {
    /// Name of the key column in [`YearTable::to_frame`].
    const COLUMN: &'static str;

    /// Chart date label for this key, pinned to `display_year`.
    fn label(&self, display_year: i32) -> String;
}

impl RowKey for CalendarDay {
    const COLUMN: &'static str = "day";

    fn label(&self, display_year: i32) -> String {
        Self::label(self, display_year)
    }
}

impl RowKey for Month {
    const COLUMN: &'static str = "month";

    fn label(&self, display_year: i32) -> String {
        Self::label(self, display_year)
    }
}

/// Why a year is absent from a table.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// No Jan-1 (or January) reference value
    #[display("missing_anchor")]
    MissingAnchor,
    /// Reference value is zero, negative or not finite
    #[display("invalid_anchor")]
    InvalidAnchor,
    /// Not a single observation in the year
    #[display("no_observations")]
    NoObservations,
}

/// A year dropped from aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExcludedYear {
    /// Calendar year
    pub year: i32,
    /// Reason for exclusion
    pub reason: ExclusionReason,
}

/// Year-by-key matrix of values.
#[derive(Debug, Clone, PartialEq)]
pub struct YearTable<K> {
    keys: Vec<K>,
    years: Vec<i32>,
    columns: Vec<Vec<Option<f64>>>,
    mean: Option<Vec<Option<f64>>>,
    excluded: Vec<ExcludedYear>,
}

impl<K: RowKey> YearTable<K> {
    /// Empty table over `keys` (must be sorted ascending).
    pub const fn new(keys: Vec<K>) -> Self {
        Self {
            keys,
            years: Vec::new(),
            columns: Vec::new(),
            mean: None,
            excluded: Vec::new(),
        }
    }

    /// Add or replace the column for `year`.
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalityError::Computation`] if the column length does not
    /// match the number of keys.
    pub fn insert_year(&mut self, year: i32, column: Vec<Option<f64>>) -> Result<()> {
        if column.len() != self.keys.len() {
            return Err(SeasonalityError::Computation(format!(
                "column for {year} has {} rows, table has {}",
                column.len(),
                self.keys.len()
            )));
        }

        match self.years.binary_search(&year) {
            Ok(i) => self.columns[i] = column,
            Err(i) => {
                self.years.insert(i, year);
                self.columns.insert(i, column);
            }
        }
        Ok(())
    }

    /// Record that `year` was left out.
    pub fn exclude(&mut self, year: i32, reason: ExclusionReason) {
        warn!(year, %reason, "year excluded from aggregation");
        self.excluded.push(ExcludedYear { year, reason });
    }

    /// Fill each year column backward, then forward, leaving no gaps.
    pub fn fill_backward_then_forward(&mut self) -> Result<()> {
        self.fill_with(&[
            FillNullStrategy::Backward(None),
            FillNullStrategy::Forward(None),
        ])
    }

    /// Fill each year column forward only; leading gaps stay empty.
    pub fn fill_forward(&mut self) -> Result<()> {
        self.fill_with(&[FillNullStrategy::Forward(None)])
    }

    /// Attach the row-wise mean across included years, ignoring gaps and NaN.
    pub fn with_mean(mut self) -> Result<Self> {
        let years: Vec<Expr> = self
            .years
            .iter()
            .map(|year| col(year.to_string()).fill_nan(lit(NULL)))
            .collect();
        if years.is_empty() {
            self.mean = Some(vec![None; self.keys.len()]);
            return Ok(self);
        }

        let mean = self
            .year_frame()?
            .lazy()
            .select([mean_horizontal(years, true)?.alias(MEAN)])
            .collect()?;
        self.mean = Some(f64_values(&mean, MEAN)?);
        Ok(self)
    }

    fn fill_with(&mut self, strategies: &[FillNullStrategy]) -> Result<()> {
        if self.years.is_empty() {
            return Ok(());
        }

        let mut frame = self.year_frame()?;
        for strategy in strategies {
            frame = frame.fill_null(*strategy)?;
        }
        self.columns = self
            .years
            .iter()
            .map(|year| f64_values(&frame, &year.to_string()))
            .collect::<Result<_>>()?;
        Ok(())
    }

    /// One `Float64` column per included year, named by the year.
    fn year_frame(&self) -> Result<DataFrame> {
        let columns = self
            .years
            .iter()
            .zip(&self.columns)
            .map(|(year, values)| {
                Column::from(Series::new(year.to_string().into(), values.as_slice()))
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Row keys in order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Included years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// The `n` most recent included years, newest first.
    pub fn recent_years(&self, n: usize) -> Vec<i32> {
        self.years.iter().rev().take(n).copied().collect()
    }

    /// Column of `year`, if included.
    pub fn column(&self, year: i32) -> Option<&[Option<f64>]> {
        self.years
            .binary_search(&year)
            .ok()
            .map(|i| self.columns[i].as_slice())
    }

    /// Value at `(key, year)`.
    pub fn value(&self, key: K, year: i32) -> Option<f64> {
        let row = self.row(key)?;
        self.column(year).and_then(|c| c[row])
    }

    /// Cross-year mean column, if computed.
    pub fn mean(&self) -> Option<&[Option<f64>]> {
        self.mean.as_deref()
    }

    /// Cross-year mean at `key`.
    pub fn mean_at(&self, key: K) -> Option<f64> {
        let row = self.row(key)?;
        self.mean.as_ref().and_then(|m| m[row])
    }

    /// Years left out of the table.
    pub fn excluded(&self) -> &[ExcludedYear] {
        &self.excluded
    }

    /// Whether no year made it into the table.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    fn row(&self, key: K) -> Option<usize> {
        self.keys.binary_search(&key).ok()
    }

    /// Materialize as a DataFrame: key column, one column per year, then `mean`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let keys: Vec<String> = self.keys.iter().map(ToString::to_string).collect();
        let mut frame = DataFrame::new(vec![Column::from(Series::new(K::COLUMN.into(), keys))])?;

        frame.hstack_mut(self.year_frame()?.get_columns())?;
        if let Some(mean) = &self.mean {
            frame.with_column(Series::new(MEAN.into(), mean.as_slice()))?;
        }

        Ok(frame)
    }
}
