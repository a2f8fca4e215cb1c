//! Cumulative volume - year-to-date traded volume by calendar day.

use super::day_slot;
use crate::{
    DailySeries, Result,
    calendar::{CALENDAR_SLOTS, CalendarDay},
    series::{DAY, MONTH, VOLUME, YEAR, f64_values, i32_values},
    table::{ExclusionReason, YearTable},
    traits::{Aggregation, Granularity},
};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Running volume sum from Jan-1 by calendar day and year.
pub type CumulativeVolumeTable = YearTable<CalendarDay>;

const CUMULATIVE_VOLUME: &str = "cumulative_volume";

/// Cumulative volume aggregation.
///
/// Slots a year did not trade on (Feb-29 of common years, days after the last
/// observation) carry the running total forward. Slots before the year's
/// first observation stay empty.
///
/// # Required Columns
/// - `year`, `month`, `day`: Calendar position
/// - `volume`: Daily traded volume
///
/// # Returns
/// DataFrame with columns: `day` and one per included year
#[derive(Debug, Clone, Default)]
pub struct CumulativeVolume;

impl CumulativeVolume {
    /// Create a new CumulativeVolume aggregation.
    pub const fn new() -> Self {
        Self
    }

    /// Compute the year-to-date volume table.
    pub fn table(&self, series: &DailySeries) -> Result<CumulativeVolumeTable> {
        let running = series
            .frame()
            .clone()
            .lazy()
            .with_column(
                col(VOLUME)
                    .cum_sum(false)
                    .over([col(YEAR)])
                    .alias(CUMULATIVE_VOLUME),
            )
            .select([col(YEAR), col(MONTH), col(DAY), col(CUMULATIVE_VOLUME)])
            .collect()?;

        let rows = i32_values(&running, YEAR)?
            .into_iter()
            .zip(i32_values(&running, MONTH)?)
            .zip(i32_values(&running, DAY)?)
            .zip(f64_values(&running, CUMULATIVE_VOLUME)?);

        let mut years: BTreeMap<i32, Vec<Option<f64>>> = BTreeMap::new();
        for (((year, month), day), total) in rows {
            let (Some(year), Some(slot)) = (year, day_slot(month, day)) else {
                continue;
            };
            years
                .entry(year)
                .or_insert_with(|| vec![None; CALENDAR_SLOTS])[slot] = total;
        }

        let mut table = CumulativeVolumeTable::new(CalendarDay::all().collect());
        for (year, values) in years {
            if values.iter().all(Option::is_none) {
                table.exclude(year, ExclusionReason::NoObservations);
            } else {
                table.insert_year(year, values)?;
            }
        }
        table.fill_forward()?;
        debug!(years = ?table.years(), "cumulative volume computed");

        Ok(table)
    }
}

impl Aggregation for CumulativeVolume {
    fn name(&self) -> &str {
        "cumulative_volume"
    }

    fn description(&self) -> &str {
        "Year-to-date running sum of traded volume by calendar day"
    }

    fn required_columns(&self) -> &[&str] {
        &["year", "month", "day", "volume"]
    }

    fn granularity(&self) -> Granularity {
        Granularity::Daily
    }

    fn compute(&self, series: &DailySeries) -> Result<DataFrame> {
        self.table(series)?.to_frame()
    }
}
