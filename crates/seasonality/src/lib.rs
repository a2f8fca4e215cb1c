#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/seasonality/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregations;
pub mod calendar;
pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod risk;
pub mod series;
pub mod source;
pub mod table;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export core types
pub use aggregations::{
    CumulativeVolume, CumulativeVolumeTable, MonthlyVolatility, MonthlyVolatilityConfig,
    PriceSeasonality, SeasonalityTable, VolatilityTable, VolumeSeasonality, VolumeSeasonalityTable,
};
pub use calendar::{CalendarDay, DateWindow, Month};
pub use chart::{ChartRecord, OutputShape};
pub use config::SeasonalityConfig;
pub use engine::{Report, SeasonalityEngine};
pub use error::{Result, SeasonalityError};
pub use registry::{AggregationInfo, AggregationRegistry};
pub use risk::{AnnualReturn, RiskSummary};
pub use series::DailySeries;
pub use source::{CsvDirectorySource, DataSource, InMemorySource};
pub use table::{ExcludedYear, ExclusionReason, YearTable};
pub use traits::{Aggregation, AggregationConfig, ConfigurableAggregation, Granularity};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
