//! Market data sources.
//!
//! A source returns raw daily observations (`date`, `close`, `volume`) for a
//! ticker, usually trading days only. Gaps are handled by
//! [`DailySeries::align`](crate::DailySeries::align).

use crate::{
    Result, SeasonalityError,
    series::{CLOSE, DATE, VOLUME, with_parsed_dates},
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Provider of raw daily observations.
pub trait DataSource: Send + Sync + std::fmt::Debug {
    /// Observations for `ticker` between `start` and `end`, both inclusive.
    ///
    /// # Errors
    ///
    /// [`SeasonalityError::DataUnavailable`] if the ticker is unknown, the
    /// source cannot be read, or it has nothing in the range.
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame>;
}

/// Tickers held in memory, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    frames: HashMap<String, DataFrame>,
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the frame for `ticker`.
    pub fn with_frame(mut self, ticker: impl Into<String>, frame: DataFrame) -> Self {
        self.frames.insert(ticker.into(), frame);
        self
    }
}

impl DataSource for InMemorySource {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        let frame = self
            .frames
            .get(ticker)
            .ok_or_else(|| SeasonalityError::unavailable(ticker, "unknown ticker"))?;
        within(ticker, &with_parsed_dates(frame)?, start, end)
    }
}

/// Directory of `<TICKER>.csv` files.
///
/// Headers are matched case-insensitively with spaces read as underscores, so
/// the usual `Date,Open,High,Low,Close,Adj Close,Volume` export works as is.
/// An adjusted close column is preferred over the raw close. Dates must be
/// `YYYY-MM-DD`, optionally followed by a time.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
}

impl CsvDirectorySource {
    /// Create a source reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the source reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.root.join(format!("{ticker}.csv"))
    }
}

impl DataSource for CsvDirectorySource {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        let path = self.path_for(ticker);
        if !path.is_file() {
            return Err(SeasonalityError::unavailable(
                ticker,
                format!("no file at {}", path.display()),
            ));
        }
        debug!(ticker, path = %path.display(), "reading csv");

        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path))?
            .finish()
            .map_err(|e| SeasonalityError::unavailable(ticker, e.to_string()))?;

        let normalized = normalize_columns(&raw)?;
        within(ticker, &normalized, start, end)
    }
}

/// Rename provider columns to `date`, `close`, `volume` and drop the rest.
fn normalize_columns(raw: &DataFrame) -> Result<DataFrame> {
    let find = |wanted: &str| {
        raw.get_column_names()
            .into_iter()
            .find(|name| name.trim().to_lowercase().replace(' ', "_") == wanted)
            .map(|name| name.to_string())
    };

    let date = find("date").ok_or_else(|| SeasonalityError::MissingColumn(DATE.to_string()))?;
    let close = find("adj_close")
        .or_else(|| find("close"))
        .ok_or_else(|| SeasonalityError::MissingColumn(CLOSE.to_string()))?;
    let volume =
        find("volume").ok_or_else(|| SeasonalityError::MissingColumn(VOLUME.to_string()))?;

    let frame = raw
        .clone()
        .lazy()
        .select([
            col(date.as_str()).alias(DATE),
            col(close.as_str()).cast(DataType::Float64).alias(CLOSE),
            col(volume.as_str()).cast(DataType::Float64).alias(VOLUME),
        ])
        .collect()?;

    with_parsed_dates(&frame)
}

/// Rows of `frame` dated within `[start, end]`; empty is unavailable.
fn within(ticker: &str, frame: &DataFrame, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
    let filtered = frame
        .clone()
        .lazy()
        .filter(
            col(DATE)
                .gt_eq(lit(start).cast(DataType::Date))
                .and(col(DATE).lt_eq(lit(end).cast(DataType::Date))),
        )
        .collect()?;

    if filtered.height() == 0 {
        return Err(SeasonalityError::unavailable(
            ticker,
            format!("no observations between {start} and {end}"),
        ));
    }
    debug!(ticker, rows = filtered.height(), "fetched observations");

    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date_values, raw_frame};
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_in_memory_filters_window() {
        let source = InMemorySource::new().with_frame(
            "AAPL",
            raw_frame(&[
                ("2019-12-31", 1.0, 1.0),
                ("2020-01-02", 2.0, 2.0),
                ("2020-01-03", 3.0, 3.0),
            ]),
        );

        let frame = source
            .fetch("AAPL", date(2020, 1, 1), date(2020, 1, 2))
            .unwrap();
        assert_eq!(frame.height(), 1);
    }

    #[test]
    fn test_in_memory_unknown_ticker() {
        let source = InMemorySource::new();
        let result = source.fetch("NOPE", date(2020, 1, 1), date(2020, 12, 31));
        assert!(matches!(
            result,
            Err(SeasonalityError::DataUnavailable { ticker, .. }) if ticker == "NOPE"
        ));
    }

    #[test]
    fn test_empty_window_is_unavailable() {
        let source =
            InMemorySource::new().with_frame("AAPL", raw_frame(&[("2019-12-31", 1.0, 1.0)]));
        let result = source.fetch("AAPL", date(2020, 1, 1), date(2020, 12, 31));
        assert!(matches!(result, Err(SeasonalityError::DataUnavailable { .. })));
    }

    #[test]
    fn test_csv_with_provider_headers() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("TSLA.csv")).unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Adj Close,Volume").unwrap();
        writeln!(file, "2020-01-02 00:00:00,1,1,1,28.68,28.60,142981500").unwrap();
        writeln!(file, "2020-01-03 00:00:00,1,1,1,29.53,29.50,266677500").unwrap();
        drop(file);

        let source = CsvDirectorySource::new(dir.path());
        let frame = source
            .fetch("TSLA", date(2020, 1, 1), date(2020, 12, 31))
            .unwrap();

        assert_eq!(frame.height(), 2);
        assert_eq!(
            date_values(&frame, DATE),
            vec![Some(date(2020, 1, 2)), Some(date(2020, 1, 3))]
        );
        let closes = frame.column("close").unwrap().f64().unwrap();
        assert_eq!(closes.get(0), Some(28.60));
        let volumes = frame.column("volume").unwrap().f64().unwrap();
        assert_eq!(volumes.get(1), Some(266_677_500.0));
    }

    #[test]
    fn test_csv_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvDirectorySource::new(dir.path());
        let result = source.fetch("MISSING", date(2020, 1, 1), date(2020, 12, 31));
        assert!(matches!(result, Err(SeasonalityError::DataUnavailable { .. })));
    }

    #[test]
    fn test_csv_without_volume_column() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("X.csv"), "date,close\n2020-01-02,1.0\n").unwrap();

        let source = CsvDirectorySource::new(dir.path());
        let result = source.fetch("X", date(2020, 1, 1), date(2020, 12, 31));
        assert!(matches!(result, Err(SeasonalityError::MissingColumn(c)) if c == "volume"));
    }

    #[test]
    fn test_csv_with_non_iso_dates_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("X.csv"),
            "Date,Close,Volume\n1/2/2020,1.0,10\n1/3/2020,1.5,10\n",
        )
        .unwrap();

        let source = CsvDirectorySource::new(dir.path());
        let result = source.fetch("X", date(2020, 1, 1), date(2020, 12, 31));
        assert!(matches!(result, Err(SeasonalityError::Computation(_))));
    }
}
