//! Calendar alignment of raw daily observations.
//!
//! Data sources return trading days only. [`DailySeries::align`] reindexes
//! those observations onto every calendar day of the requested window and
//! backward-fills weekends and holidays from the next available observation.

use crate::{DateWindow, Result, SeasonalityError};
use chrono::Datelike;
use polars::prelude::*;
use tracing::{debug, warn};

/// Date column (polars `Date`).
pub const DATE: &str = "date";
/// Calendar year of the row.
pub const YEAR: &str = "year";
/// Month of the row (1-12).
pub const MONTH: &str = "month";
/// Day of month of the row.
pub const DAY: &str = "day";
/// Closing (or adjusted closing) price.
pub const CLOSE: &str = "close";
/// Traded volume.
pub const VOLUME: &str = "volume";

/// Columns a raw frame must carry to be aligned.
pub const RAW_COLUMNS: [&str; 3] = [DATE, CLOSE, VOLUME];

/// Format of textual dates. Trailing time components are ignored.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const ROW: &str = "row";
const FIRST_OBSERVED: &str = "first_observed";

/// A contiguous daily price/volume series covering every calendar day of a window.
///
/// Columns: `date`, `year`, `month`, `day`, `close`, `volume`. Rows are sorted
/// by date. `close` and `volume` are null only after the last observation, or
/// before the first one when it lies beyond the leading fill limit.
#[derive(Debug, Clone)]
pub struct DailySeries {
    frame: DataFrame,
    window: DateWindow,
}

impl DailySeries {
    /// Align raw observations onto the full calendar of `window`.
    ///
    /// Duplicate raw dates keep their last observation. Every gap between
    /// observations is backward-filled. Days before the first observation are
    /// filled only within `max_leading_fill_days` of it (`None` for no limit),
    /// so a ticker listed mid-window does not borrow its listing price for
    /// Jan-1.
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalityError::MissingColumn`] if `raw` lacks `date`,
    /// `close` or `volume`, and [`SeasonalityError::Computation`] if `date`
    /// cannot be read as a calendar date.
    pub fn align(
        raw: &DataFrame,
        window: DateWindow,
        max_leading_fill_days: Option<u32>,
    ) -> Result<Self> {
        let schema = raw.schema();
        for name in RAW_COLUMNS {
            if !schema.contains(name) {
                return Err(SeasonalityError::MissingColumn(name.to_string()));
            }
        }

        let observations = with_parsed_dates(raw)?
            .lazy()
            .select([
                col(DATE),
                col(CLOSE).cast(DataType::Float64),
                col(VOLUME).cast(DataType::Float64),
            ])
            .group_by([col(DATE)])
            .agg([col(CLOSE).last(), col(VOLUME).last()]);

        let mut aligned = calendar_frame(window)?
            .lazy()
            .join(
                observations,
                [col(DATE)],
                [col(DATE)],
                JoinArgs::new(JoinType::Left),
            )
            .sort([DATE], SortMultipleOptions::default())
            .with_row_index(ROW, None)
            .with_column(
                col(ROW)
                    .filter(col(CLOSE).is_not_null())
                    .first()
                    .alias(FIRST_OBSERVED),
            )
            .with_columns([
                col(CLOSE).fill_null_with_strategy(FillNullStrategy::Backward(None)),
                col(VOLUME).fill_null_with_strategy(FillNullStrategy::Backward(None)),
            ]);

        if let Some(limit) = max_leading_fill_days {
            let out_of_reach = (col(ROW).cast(DataType::Int64) + lit(i64::from(limit)))
                .lt(col(FIRST_OBSERVED).cast(DataType::Int64));
            aligned = aligned.with_columns([
                when(out_of_reach.clone())
                    .then(lit(NULL))
                    .otherwise(col(CLOSE))
                    .alias(CLOSE),
                when(out_of_reach)
                    .then(lit(NULL))
                    .otherwise(col(VOLUME))
                    .alias(VOLUME),
            ]);
        }

        let frame = aligned
            .select([
                col(DATE),
                col(YEAR),
                col(MONTH),
                col(DAY),
                col(CLOSE),
                col(VOLUME),
            ])
            .collect()?;

        let series = Self { frame, window };
        let unfilled = series.unfilled_days();
        if unfilled > 0 {
            warn!(
                unfilled,
                start = %window.start(),
                end = %window.end(),
                "calendar days left without price after backward fill"
            );
        }
        debug!(rows = series.len(), "aligned daily series");

        Ok(series)
    }

    /// The aligned frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// The calendar window this series covers.
    pub const fn window(&self) -> DateWindow {
        self.window
    }

    /// Number of calendar days (rows).
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Rows whose price is still null after filling.
    pub fn unfilled_days(&self) -> usize {
        self.frame
            .column(CLOSE)
            .map_or(self.len(), |c| c.null_count())
    }

    /// Distinct calendar years present, ascending.
    pub fn years(&self) -> Result<Vec<i32>> {
        let mut years: Vec<i32> = i32_values(&self.frame, YEAR)?.into_iter().flatten().collect();
        years.dedup();
        Ok(years)
    }

    /// Daily closing prices in date order.
    pub fn closes(&self) -> Result<Vec<Option<f64>>> {
        f64_values(&self.frame, CLOSE)
    }
}

/// `raw` with its `date` column read as a polars `Date`.
///
/// Accepts `Date`, `Datetime` (truncated to the day) and `YYYY-MM-DD` strings,
/// optionally followed by a time.
///
/// # Errors
///
/// [`SeasonalityError::MissingColumn`] without a `date` column,
/// [`SeasonalityError::Computation`] for any other type or an unparseable value.
pub(crate) fn with_parsed_dates(raw: &DataFrame) -> Result<DataFrame> {
    let dtype = raw
        .schema()
        .get(DATE)
        .cloned()
        .ok_or_else(|| SeasonalityError::MissingColumn(DATE.to_string()))?;

    let date = match dtype {
        DataType::Date => return Ok(raw.clone()),
        DataType::Datetime(_, _) => col(DATE).cast(DataType::Date),
        DataType::String => col(DATE).str().to_date(StrptimeOptions {
            format: Some(DATE_FORMAT.into()),
            strict: true,
            exact: false,
            cache: true,
        }),
        other => {
            return Err(SeasonalityError::Computation(format!(
                "`{DATE}` column has unsupported type {other}"
            )));
        }
    };

    raw.clone()
        .lazy()
        .with_column(date)
        .collect()
        .map_err(|e| SeasonalityError::Computation(format!("unparseable `{DATE}` column: {e}")))
}

/// One row per calendar day of `window` with its date parts.
fn calendar_frame(window: DateWindow) -> Result<DataFrame> {
    let days: Vec<_> = window.days().collect();

    let frame = df![
        DATE => days.as_slice(),
        YEAR => days.iter().map(|d| d.year()).collect::<Vec<_>>(),
        MONTH => days.iter().map(|d| d.month() as i32).collect::<Vec<_>>(),
        DAY => days.iter().map(|d| d.day() as i32).collect::<Vec<_>>(),
    ]?;

    Ok(frame)
}

/// Read a float column into a vector.
pub(crate) fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(df.column(name)?.f64()?.into_iter().collect())
}

/// Read an i32 column into a vector.
pub(crate) fn i32_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i32>>> {
    Ok(df.column(name)?.i32()?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date_values, raw_frame};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_align_fills_weekend_backward() {
        // Friday, then Monday
        let raw = raw_frame(&[("2021-01-01", 10.0, 100.0), ("2021-01-04", 13.0, 130.0)]);
        let series = DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 4)), None).unwrap();

        assert_eq!(series.len(), 4);
        assert_eq!(series.unfilled_days(), 0);

        let closes = series.closes().unwrap();
        assert_relative_eq!(closes[0].unwrap(), 10.0);
        assert_relative_eq!(closes[1].unwrap(), 13.0);
        assert_relative_eq!(closes[2].unwrap(), 13.0);
        assert_relative_eq!(closes[3].unwrap(), 13.0);

        let volumes = f64_values(series.frame(), VOLUME).unwrap();
        assert_relative_eq!(volumes[1].unwrap(), 130.0);
    }

    #[test]
    fn test_align_covers_every_calendar_day() {
        let raw = raw_frame(&[
            ("2020-01-01", 1.0, 1.0),
            ("2020-06-15", 2.0, 2.0),
            ("2021-12-31", 3.0, 3.0),
        ]);
        let series = DailySeries::align(&raw, window((2020, 1, 1), (2021, 12, 31)), None).unwrap();

        assert_eq!(series.len(), 366 + 365);
        assert_eq!(series.unfilled_days(), 0);
        assert_eq!(series.years().unwrap(), vec![2020, 2021]);

        let dates = date_values(series.frame(), DATE);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(dates[59], NaiveDate::from_ymd_opt(2020, 2, 29));
        assert_eq!(dates[730], NaiveDate::from_ymd_opt(2021, 12, 31));
    }

    #[test]
    fn test_align_fills_interior_gaps_beyond_leading_limit() {
        let full = window((2020, 1, 1), (2021, 12, 31));
        let rows: Vec<(String, f64, f64)> = full
            .days()
            .enumerate()
            .filter(|(i, d)| i % 10 == 0 || d.ordinal() == 1 || *d == full.end())
            .map(|(i, d)| (d.to_string(), 100.0 + i as f64, 1_000.0))
            .collect();
        let borrowed: Vec<(&str, f64, f64)> =
            rows.iter().map(|(d, c, v)| (d.as_str(), *c, *v)).collect();

        let series = DailySeries::align(&raw_frame(&borrowed), full, Some(7)).unwrap();

        assert_eq!(series.len(), 731);
        assert_eq!(series.unfilled_days(), 0);
        let volumes = f64_values(series.frame(), VOLUME).unwrap();
        assert!(volumes.iter().all(Option::is_some));
    }

    #[test]
    fn test_align_leaves_trailing_days_null() {
        let raw = raw_frame(&[("2021-01-01", 10.0, 100.0), ("2021-01-02", 11.0, 110.0)]);
        let series = DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 5)), None).unwrap();

        assert_eq!(series.len(), 5);
        assert_eq!(series.unfilled_days(), 3);
    }

    #[test]
    fn test_align_limits_only_the_leading_gap() {
        let raw = raw_frame(&[("2021-01-10", 10.0, 100.0)]);
        let series =
            DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 10)), Some(3)).unwrap();

        let closes = series.closes().unwrap();
        assert!(closes[0].is_none());
        assert!(closes[5].is_none());
        assert_relative_eq!(closes[6].unwrap(), 10.0);
        assert_eq!(series.unfilled_days(), 6);

        let unlimited = DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 10)), None).unwrap();
        assert_eq!(unlimited.unfilled_days(), 0);
    }

    #[test]
    fn test_align_keeps_last_duplicate_and_ignores_out_of_window_rows() {
        let raw = raw_frame(&[
            ("2020-12-31", 1.0, 1.0),
            ("2021-01-01", 10.0, 100.0),
            ("2021-01-01", 12.0, 120.0),
            ("2021-01-02", 11.0, 110.0),
        ]);
        let series = DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 2)), None).unwrap();

        assert_eq!(series.len(), 2);
        assert_relative_eq!(series.closes().unwrap()[0].unwrap(), 12.0);
    }

    #[test]
    fn test_align_requires_raw_columns() {
        let raw = df![
            "date" => ["2021-01-01"],
            "close" => [1.0],
        ]
        .unwrap();

        let result = DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 2)), None);
        assert!(matches!(result, Err(SeasonalityError::MissingColumn(c)) if c == "volume"));
    }

    #[test]
    fn test_align_reads_timestamps_and_datetimes() {
        let raw = raw_frame(&[
            ("2021-01-01 00:00:00", 10.0, 100.0),
            ("2021-01-02 00:00:00", 11.0, 110.0),
        ]);
        let series = DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 2)), None).unwrap();
        assert_eq!(series.unfilled_days(), 0);

        let stamps = [
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(16, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 2).unwrap().and_hms_opt(16, 0, 0).unwrap(),
        ];
        let raw = df![
            "date" => stamps,
            "close" => [10.0, 11.0],
            "volume" => [100.0, 110.0],
        ]
        .unwrap();
        let series = DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 2)), None).unwrap();
        assert_relative_eq!(series.closes().unwrap()[1].unwrap(), 11.0);
        assert_eq!(series.unfilled_days(), 0);
    }

    #[test]
    fn test_align_rejects_unparseable_dates() {
        let raw = raw_frame(&[("1/2/2021", 10.0, 100.0)]);
        let result = DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 2)), None);
        assert!(matches!(result, Err(SeasonalityError::Computation(_))));

        let raw = df![
            "date" => [20210102_i64],
            "close" => [10.0],
            "volume" => [100.0],
        ]
        .unwrap();
        let result = DailySeries::align(&raw, window((2021, 1, 1), (2021, 1, 2)), None);
        assert!(matches!(result, Err(SeasonalityError::Computation(_))));
    }
}
