//! Volume seasonality - monthly traded volume relative to January.

use super::{anchor_for, exclude_or_fail};
use crate::{
    DailySeries, Result,
    calendar::Month,
    series::{CLOSE, DAY, MONTH, VOLUME, YEAR, f64_values, i32_values},
    table::{ExclusionReason, YearTable},
    traits::{Aggregation, Granularity},
};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Monthly volume as a ratio of January volume, by year, with a `mean` column.
pub type VolumeSeasonalityTable = YearTable<Month>;

const MONTHLY_VOLUME: &str = "monthly_volume";
const OBSERVATIONS: &str = "observations";
const ANCHOR: &str = "anchor";
const RATIO: &str = "ratio";
const JAN_1_OBSERVED: &str = "jan_1_observed";

/// Volume seasonality aggregation.
///
/// Sums daily volume per month and divides each month by the same year's
/// January sum, so January is exactly 1.0 for every included year.
///
/// Years are anchored like price seasonality: a year whose Jan-1 row has no
/// close or volume is excluded, as is one whose January sum is not positive.
/// Months without any observation stay empty and do not count towards the
/// mean.
///
/// # Required Columns
/// - `year`, `month`, `day`: Calendar position
/// - `close`, `volume`: Closing price and daily traded volume
///
/// # Returns
/// DataFrame with columns: `month`, one per included year, `mean`
#[derive(Debug, Clone, Default)]
pub struct VolumeSeasonality;

impl VolumeSeasonality {
    /// Create a new VolumeSeasonality aggregation.
    pub const fn new() -> Self {
        Self
    }

    /// Compute the January-rebased monthly volume table.
    pub fn table(&self, series: &DailySeries) -> Result<VolumeSeasonalityTable> {
        let jan_1 = col(MONTH).eq(lit(1)).and(col(DAY).eq(lit(1)));
        let january = col(MONTH).eq(lit(1)).and(col(OBSERVATIONS).gt(lit(0)));

        let monthly = series
            .frame()
            .clone()
            .lazy()
            .with_column(
                col(CLOSE)
                    .is_not_null()
                    .and(col(VOLUME).is_not_null())
                    .filter(jan_1)
                    .first()
                    .over([col(YEAR)])
                    .alias(JAN_1_OBSERVED),
            )
            .group_by([col(YEAR), col(MONTH)])
            .agg([
                col(VOLUME).sum().alias(MONTHLY_VOLUME),
                col(VOLUME).count().cast(DataType::Int64).alias(OBSERVATIONS),
                col(JAN_1_OBSERVED).first(),
            ])
            .with_column(
                col(MONTHLY_VOLUME)
                    .filter(january)
                    .first()
                    .over([col(YEAR)])
                    .alias(ANCHOR),
            )
            .with_column(
                when(col(OBSERVATIONS).gt(lit(0)))
                    .then(col(MONTHLY_VOLUME) / col(ANCHOR))
                    .otherwise(lit(NULL))
                    .alias(RATIO),
            )
            .sort([YEAR, MONTH], SortMultipleOptions::default())
            .collect()?;

        let observations: Vec<Option<i64>> =
            monthly.column(OBSERVATIONS)?.i64()?.into_iter().collect();
        let jan_1_observed: Vec<Option<bool>> =
            monthly.column(JAN_1_OBSERVED)?.bool()?.into_iter().collect();
        let rows = i32_values(&monthly, YEAR)?
            .into_iter()
            .zip(i32_values(&monthly, MONTH)?)
            .zip(f64_values(&monthly, ANCHOR)?)
            .zip(f64_values(&monthly, RATIO)?)
            .zip(observations.into_iter().zip(jan_1_observed));

        let mut years: BTreeMap<i32, YearVolume> = BTreeMap::new();
        for ((((year, month), anchor), ratio), (count, anchored)) in rows {
            let (Some(year), Some(month)) = (year, month.and_then(|m| Month::new(m as u32))) else {
                continue;
            };
            let entry = years.entry(year).or_insert_with(YearVolume::default);
            entry.anchor = anchor;
            entry.anchored |= anchored.unwrap_or(false);
            entry.observed += count.unwrap_or(0);
            entry.ratios[month.index()] = ratio;
        }

        let mut table = VolumeSeasonalityTable::new(Month::all().collect());
        for (year, volume) in years {
            if volume.observed == 0 {
                table.exclude(year, ExclusionReason::NoObservations);
                continue;
            }
            let anchor = if volume.anchored { volume.anchor } else { None };
            match anchor_for(year, anchor) {
                Ok(_) => table.insert_year(year, volume.ratios)?,
                Err(err) => exclude_or_fail(&mut table, year, err)?,
            }
        }
        debug!(years = ?table.years(), "volume seasonality computed");

        table.with_mean()
    }
}

#[derive(Debug)]
struct YearVolume {
    anchor: Option<f64>,
    anchored: bool,
    observed: i64,
    ratios: Vec<Option<f64>>,
}

impl Default for YearVolume {
    fn default() -> Self {
        Self {
            anchor: None,
            anchored: false,
            observed: 0,
            ratios: vec![None; 12],
        }
    }
}

impl Aggregation for VolumeSeasonality {
    fn name(&self) -> &str {
        "volume_seasonality"
    }

    fn description(&self) -> &str {
        "Monthly traded volume as a ratio of the same year's January volume"
    }

    fn required_columns(&self) -> &[&str] {
        &["year", "month", "day", "close", "volume"]
    }

    fn granularity(&self) -> Granularity {
        Granularity::Monthly
    }

    fn compute(&self, series: &DailySeries) -> Result<DataFrame> {
        self.table(series)?.to_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DateWindow,
        aggregations::PriceSeasonality,
        testing::{aligned, daily_raw_frame, random_walk_frame},
    };
    use approx::assert_relative_eq;
    use chrono::{Datelike, NaiveDate};

    fn month(number: u32) -> Month {
        Month::new(number).unwrap()
    }

    #[test]
    fn test_monthly_ratio_to_january() {
        let window = DateWindow::from_years(2021, 2021).unwrap();
        // 10 per day in January, 20 per day afterwards
        let raw = daily_raw_frame(window, |_| 1.0, |d| if d.month() == 1 { 10.0 } else { 20.0 });
        let table = VolumeSeasonality::new().table(&aligned(&raw, 2021, 2021)).unwrap();

        assert_eq!(table.years(), &[2021]);
        assert_relative_eq!(table.value(Month::JANUARY, 2021).unwrap(), 1.0);
        // February: 28 days * 20 / (31 days * 10)
        assert_relative_eq!(
            table.value(month(2), 2021).unwrap(),
            560.0 / 310.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            table.value(month(4), 2021).unwrap(),
            600.0 / 310.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_january_is_one_for_every_year() {
        let window = DateWindow::from_years(2017, 2021).unwrap();
        let table = VolumeSeasonality::new()
            .table(&aligned(&random_walk_frame(window, 9), 2017, 2021))
            .unwrap();

        assert_eq!(table.years().len(), 5);
        for year in table.years() {
            assert_eq!(table.value(Month::JANUARY, *year), Some(1.0));
        }
        assert_relative_eq!(table.mean_at(Month::JANUARY).unwrap(), 1.0);
    }

    #[test]
    fn test_mean_skips_unobserved_months() {
        let window = DateWindow::from_years(2020, 2021).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 6, 30).unwrap();
        let raw = daily_raw_frame(
            DateWindow::new(window.start(), end).unwrap(),
            |_| 1.0,
            |d| if d.year() == 2020 { 10.0 } else { 30.0 },
        );
        let series = DailySeries::align(&raw, window, None).unwrap();
        let table = VolumeSeasonality::new().table(&series).unwrap();

        assert_eq!(table.years(), &[2020, 2021]);
        assert!(table.value(month(9), 2021).is_none());
        assert_eq!(table.mean_at(month(9)), table.value(month(9), 2020));
    }

    #[test]
    fn test_year_without_january_volume_is_excluded() {
        let window = DateWindow::from_years(2020, 2021).unwrap();
        let raw = daily_raw_frame(
            window,
            |_| 1.0,
            |d| if d.year() == 2020 && d.month() == 1 { 0.0 } else { 5.0 },
        );
        let table = VolumeSeasonality::new().table(&aligned(&raw, 2020, 2021)).unwrap();

        assert_eq!(table.years(), &[2021]);
        assert_eq!(table.excluded()[0].year, 2020);
        assert_eq!(table.excluded()[0].reason, ExclusionReason::InvalidAnchor);
    }

    #[test]
    fn test_metadata() {
        let aggregation = VolumeSeasonality::new();
        assert_eq!(aggregation.name(), "volume_seasonality");
        assert_eq!(aggregation.granularity(), Granularity::Monthly);
        assert_eq!(
            aggregation.required_columns(),
            &["year", "month", "day", "close", "volume"]
        );
    }

    #[test]
    fn test_year_without_jan_1_is_excluded_like_price() {
        let window = DateWindow::from_years(2020, 2021).unwrap();
        let listed = NaiveDate::from_ymd_opt(2020, 1, 20).unwrap();
        let raw = daily_raw_frame(
            DateWindow::new(listed, window.end()).unwrap(),
            |d| 10.0 + f64::from(d.ordinal()),
            |d| if d.month() == 2 { 30.0 } else { 10.0 },
        );
        let series = DailySeries::align(&raw, window, Some(7)).unwrap();

        let volume = VolumeSeasonality::new().table(&series).unwrap();
        let price = PriceSeasonality::new().table(&series).unwrap();

        assert_eq!(volume.years(), price.years());
        assert_eq!(volume.years(), &[2021]);
        assert_eq!(volume.excluded()[0].year, 2020);
        assert_eq!(volume.excluded()[0].reason, ExclusionReason::MissingAnchor);
        assert_relative_eq!(
            volume.mean_at(month(2)).unwrap(),
            28.0 * 30.0 / (31.0 * 10.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_window_starting_after_jan_1_has_no_anchor() {
        let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        let window = DateWindow::new(start, end).unwrap();
        let raw = daily_raw_frame(window, |_| 1.0, |_| 5.0);
        let series = DailySeries::align(&raw, window, None).unwrap();

        let table = VolumeSeasonality::new().table(&series).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.excluded()[0].reason, ExclusionReason::MissingAnchor);
    }
}
