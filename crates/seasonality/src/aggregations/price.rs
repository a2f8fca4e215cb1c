//! Price seasonality - average year-to-date return by calendar day.
//!
//! Each year's closes are re-expressed as the percentage change from that
//! year's Jan-1 close, laid onto the 366-slot calendar, and averaged across
//! years.

use super::{anchor_for, day_slot, exclude_or_fail};
use crate::{
    DailySeries, Result,
    calendar::{CALENDAR_SLOTS, CalendarDay},
    series::{CLOSE, DAY, MONTH, YEAR, f64_values, i32_values},
    table::YearTable,
    traits::{Aggregation, Granularity},
};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Rebased returns (percent) by calendar day and year, with a `mean` column.
pub type SeasonalityTable = YearTable<CalendarDay>;

const ANCHOR: &str = "anchor";
const REBASED: &str = "rebased";

/// Price seasonality aggregation.
///
/// Formula: `rebased[day] = (close[day] - close[Jan-1]) / close[Jan-1] × 100`
///
/// Years without a usable Jan-1 close are excluded. Remaining gaps in a year
/// column (Feb-29 of common years, days past the last observation) are filled
/// backward, then forward, so the table is dense.
///
/// # Required Columns
/// - `year`, `month`, `day`: Calendar position
/// - `close`: Closing price
///
/// # Returns
/// DataFrame with columns: `day`, one per included year, `mean`
#[derive(Debug, Clone, Default)]
pub struct PriceSeasonality;

impl PriceSeasonality {
    /// Create a new PriceSeasonality aggregation.
    pub const fn new() -> Self {
        Self
    }

    /// Compute the rebased seasonality table.
    pub fn table(&self, series: &DailySeries) -> Result<SeasonalityTable> {
        let jan_1 = col(MONTH).eq(lit(1)).and(col(DAY).eq(lit(1)));

        let rebased = series
            .frame()
            .clone()
            .lazy()
            .with_column(
                col(CLOSE)
                    .filter(jan_1)
                    .first()
                    .over([col(YEAR)])
                    .alias(ANCHOR),
            )
            .with_column(((col(CLOSE) - col(ANCHOR)) / col(ANCHOR) * lit(100.0)).alias(REBASED))
            .select([col(YEAR), col(MONTH), col(DAY), col(ANCHOR), col(REBASED)])
            .collect()?;

        let rows = i32_values(&rebased, YEAR)?
            .into_iter()
            .zip(i32_values(&rebased, MONTH)?)
            .zip(i32_values(&rebased, DAY)?)
            .zip(f64_values(&rebased, ANCHOR)?)
            .zip(f64_values(&rebased, REBASED)?);

        // year -> (anchor, values by slot)
        let mut years: BTreeMap<i32, (Option<f64>, Vec<Option<f64>>)> = BTreeMap::new();
        for ((((year, month), day), anchor), value) in rows {
            let (Some(year), Some(slot)) = (year, day_slot(month, day)) else {
                continue;
            };
            let entry = years
                .entry(year)
                .or_insert_with(|| (None, vec![None; CALENDAR_SLOTS]));
            entry.0 = anchor;
            entry.1[slot] = value;
        }

        let mut table = SeasonalityTable::new(CalendarDay::all().collect());
        for (year, (anchor, values)) in years {
            match anchor_for(year, anchor) {
                Ok(_) => table.insert_year(year, values)?,
                Err(err) => exclude_or_fail(&mut table, year, err)?,
            }
        }
        table.fill_backward_then_forward()?;

        if table.is_empty() {
            warn!(
                start = %series.window().start(),
                end = %series.window().end(),
                "no year in window has a Jan-1 anchor"
            );
        }
        debug!(years = ?table.years(), "price seasonality computed");

        table.with_mean()
    }
}

impl Aggregation for PriceSeasonality {
    fn name(&self) -> &str {
        "price_seasonality"
    }

    fn description(&self) -> &str {
        "Average percentage change from the Jan-1 close by calendar day"
    }

    fn required_columns(&self) -> &[&str] {
        &["year", "month", "day", "close"]
    }

    fn granularity(&self) -> Granularity {
        Granularity::Daily
    }

    fn compute(&self, series: &DailySeries) -> Result<DataFrame> {
        self.table(series)?.to_frame()
    }
}
