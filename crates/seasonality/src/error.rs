//! Error types for seasonality computations.

use crate::table::ExclusionReason;
use thiserror::Error;

/// Result type for seasonality operations.
pub type Result<T> = std::result::Result<T, SeasonalityError>;

/// Errors that can occur while fetching or aggregating a daily series.
#[derive(Debug, Error)]
pub enum SeasonalityError {
    /// Ticker unknown to the data source, or the source could not be read
    #[error("Data unavailable for {ticker}: {reason}")]
    DataUnavailable {
        /// Requested ticker
        ticker: String,
        /// Source-specific explanation
        reason: String,
    },

    /// A year has no Jan-1 reference value to rebase against
    #[error("No Jan-1 anchor for year {year}")]
    MissingAnchor {
        /// Year without an anchor
        year: i32,
    },

    /// A year's reference value cannot be used as a divisor
    #[error("Invalid anchor {value} for year {year}")]
    InvalidAnchor {
        /// Year of the anchor
        year: i32,
        /// Offending reference value
        value: f64,
    },

    /// Missing required column in input data
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Insufficient data for a statistic
    #[error("Insufficient data: need {required} values, got {available}")]
    InsufficientData {
        /// Required number of values
        required: usize,
        /// Available number of values
        available: usize,
    },

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Aggregation not found in registry
    #[error("Aggregation not found: {0}")]
    NotFound(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

impl SeasonalityError {
    /// The table exclusion this error maps to, if it only invalidates one year.
    pub const fn exclusion_reason(&self) -> Option<ExclusionReason> {
        match self {
            Self::MissingAnchor { .. } => Some(ExclusionReason::MissingAnchor),
            Self::InvalidAnchor { .. } => Some(ExclusionReason::InvalidAnchor),
            _ => None,
        }
    }

    /// Shorthand for [`SeasonalityError::DataUnavailable`].
    pub fn unavailable(ticker: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}
