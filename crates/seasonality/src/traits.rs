//! Core trait definitions for aggregations.
//!
//! Every seasonal statistic implements [`Aggregation`], which turns an aligned
//! [`DailySeries`] into a per-year table materialized as a DataFrame.

use crate::{DailySeries, Result};
use derive_more::Display;
use polars::prelude::*;

/// Row granularity of an aggregation's output.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One row per calendar day slot (366 rows)
    Daily,
    /// One row per month (12 rows)
    Monthly,
}

/// A seasonal statistic computed from an aligned daily series.
pub trait Aggregation: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this aggregation.
    ///
    /// Should be snake_case and stable across versions.
    fn name(&self) -> &str;

    /// Human-readable description of what this aggregation measures.
    fn description(&self) -> &str;

    /// Columns of the aligned series the aggregation reads.
    fn required_columns(&self) -> &[&str];

    /// Row granularity of the result.
    fn granularity(&self) -> Granularity;

    /// Compute the per-year table.
    ///
    /// Returns a DataFrame with a key column (`day` or `month`), one column per
    /// included year, and a `mean` column when the aggregation averages years.
    fn compute(&self, series: &DailySeries) -> Result<DataFrame>;
}

/// Marker trait for aggregation configuration types.
///
/// All config types should implement Default, Clone, Send, Sync, and Debug.
pub trait AggregationConfig: Default + Clone + Send + Sync + std::fmt::Debug {}

/// An aggregation that supports runtime configuration.
pub trait ConfigurableAggregation: Aggregation {
    /// Configuration type for this aggregation.
    type Config: AggregationConfig;

    /// Create a new aggregation with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Returns the current configuration.
    fn config(&self) -> &Self::Config;
}

/// Blanket implementation for any type that satisfies the trait bounds.
impl<T: Default + Clone + Send + Sync + std::fmt::Debug> AggregationConfig for T {}
