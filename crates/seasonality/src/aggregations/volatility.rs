//! Volatility seasonality - dispersion of daily closes within each month.

use crate::{
    DailySeries, Result,
    calendar::Month,
    series::{CLOSE, MONTH, YEAR, f64_values, i32_values},
    table::{ExclusionReason, YearTable},
    traits::{Aggregation, ConfigurableAggregation, Granularity},
};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Standard deviation of daily close by month and year.
pub type VolatilityTable = YearTable<Month>;

const VOLATILITY: &str = "volatility";
const OBSERVATIONS: &str = "observations";

/// Configuration for the MonthlyVolatility aggregation.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct MonthlyVolatilityConfig {
    /// Delta degrees of freedom: 1 for sample, 0 for population standard deviation.
    pub ddof: u8,
}

impl Default for MonthlyVolatilityConfig {
    fn default() -> Self {
        Self { ddof: 1 }
    }
}

/// Monthly volatility aggregation.
///
/// Computes the standard deviation of the daily close within each month of
/// each year. Values are in price units and are not rebased. Sample standard
/// deviation (`ddof = 1`) by default.
///
/// # Required Columns
/// - `year`, `month`: Calendar position
/// - `close`: Closing price
///
/// # Returns
/// DataFrame with columns: `month` and one per included year
#[derive(Debug, Clone, Default)]
pub struct MonthlyVolatility {
    config: MonthlyVolatilityConfig,
}

impl MonthlyVolatility {
    /// Create a new MonthlyVolatility aggregation using sample standard deviation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the monthly volatility table.
    pub fn table(&self, series: &DailySeries) -> Result<VolatilityTable> {
        let monthly = series
            .frame()
            .clone()
            .lazy()
            .group_by([col(YEAR), col(MONTH)])
            .agg([
                col(CLOSE).std(self.config.ddof).alias(VOLATILITY),
                col(CLOSE).count().cast(DataType::Int64).alias(OBSERVATIONS),
            ])
            .sort([YEAR, MONTH], SortMultipleOptions::default())
            .collect()?;

        let observations: Vec<Option<i64>> =
            monthly.column(OBSERVATIONS)?.i64()?.into_iter().collect();
        let rows = i32_values(&monthly, YEAR)?
            .into_iter()
            .zip(i32_values(&monthly, MONTH)?)
            .zip(f64_values(&monthly, VOLATILITY)?)
            .zip(observations);

        let mut years: BTreeMap<i32, (i64, Vec<Option<f64>>)> = BTreeMap::new();
        for (((year, month), volatility), count) in rows {
            let (Some(year), Some(month)) = (year, month.and_then(|m| Month::new(m as u32))) else {
                continue;
            };
            let entry = years.entry(year).or_insert_with(|| (0, vec![None; 12]));
            entry.0 += count.unwrap_or(0);
            entry.1[month.index()] = volatility;
        }

        let mut table = VolatilityTable::new(Month::all().collect());
        for (year, (observed, values)) in years {
            if observed == 0 {
                table.exclude(year, ExclusionReason::NoObservations);
            } else {
                table.insert_year(year, values)?;
            }
        }
        debug!(years = ?table.years(), ddof = self.config.ddof, "monthly volatility computed");

        Ok(table)
    }
}

impl ConfigurableAggregation for MonthlyVolatility {
    type Config = MonthlyVolatilityConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Aggregation for MonthlyVolatility {
    fn name(&self) -> &str {
        "monthly_volatility"
    }

    fn description(&self) -> &str {
        "Standard deviation of daily close within each month"
    }

    fn required_columns(&self) -> &[&str] {
        &["year", "month", "close"]
    }

    fn granularity(&self) -> Granularity {
        Granularity::Monthly
    }

    fn compute(&self, series: &DailySeries) -> Result<DataFrame> {
        self.table(series)?.to_frame()
    }
}
