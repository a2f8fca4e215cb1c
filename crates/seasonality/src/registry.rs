//! Aggregation registry for discovery and introspection.

use crate::{
    DailySeries, Result, SeasonalityError,
    aggregations::{CumulativeVolume, MonthlyVolatility, PriceSeasonality, VolumeSeasonality},
    traits::{Aggregation, Granularity},
};
use polars::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Metadata for aggregation introspection.
#[derive(Debug, Clone)]
pub struct AggregationInfo {
    /// Aggregation name (unique identifier)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Required columns of the aligned series
    pub required_columns: Vec<String>,
    /// Row granularity
    pub granularity: Granularity,
}

/// Registry for aggregation discovery.
#[derive(Debug, Default)]
pub struct AggregationRegistry {
    aggregations: HashMap<String, Arc<dyn Aggregation>>,
}

impl AggregationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            aggregations: HashMap::new(),
        }
    }

    /// Register all standard aggregations.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(PriceSeasonality::new()));
        registry.register(Arc::new(VolumeSeasonality::new()));
        registry.register(Arc::new(MonthlyVolatility::new()));
        registry.register(Arc::new(CumulativeVolume::new()));

        registry
    }

    /// Register an aggregation.
    pub fn register(&mut self, aggregation: Arc<dyn Aggregation>) {
        self.aggregations
            .insert(aggregation.name().to_string(), aggregation);
    }

    /// Get an aggregation by name.
    pub fn get(&self, name: &str) -> Option<&dyn Aggregation> {
        self.aggregations.get(name).map(|a| a.as_ref())
    }

    /// Compute the named aggregation.
    pub fn compute(&self, name: &str, series: &DailySeries) -> Result<DataFrame> {
        self.get(name)
            .ok_or_else(|| SeasonalityError::NotFound(name.to_string()))?
            .compute(series)
    }

    /// Get all aggregation metadata, sorted by name.
    pub fn all_info(&self) -> Vec<AggregationInfo> {
        let mut info: Vec<_> = self
            .aggregations
            .values()
            .map(|a| AggregationInfo {
                name: a.name().to_string(),
                description: a.description().to_string(),
                required_columns: a.required_columns().iter().map(|s| s.to_string()).collect(),
                granularity: a.granularity(),
            })
            .collect();
        info.sort_by(|a, b| a.name.cmp(&b.name));
        info
    }

    /// Get all aggregation names.
    pub fn names(&self) -> Vec<&str> {
        self.aggregations.keys().map(|s| s.as_str()).collect()
    }

    /// Number of registered aggregations.
    pub fn len(&self) -> usize {
        self.aggregations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.aggregations.is_empty()
    }
}
