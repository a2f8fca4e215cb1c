//! Engine configuration.

use crate::{
    DateWindow, Result, SeasonalityError,
    calendar::is_leap_year,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Explicit settings for a [`SeasonalityEngine`](crate::SeasonalityEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalityConfig {
    /// Year chart dates are relabelled onto. Must be a leap year.
    pub display_year: i32,
    /// First year of the window when a request names none.
    pub default_start_year: i32,
    /// Last year of the window when a request names none.
    pub default_end_year: i32,
    /// Days before the first observation that may borrow its value. Gaps
    /// between observations are always filled.
    pub max_leading_fill_days: Option<u32>,
    /// Number of recent years in the top-N chart shape.
    pub top_years: usize,
    /// Delta degrees of freedom for monthly volatility.
    pub volatility_ddof: u8,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self {
            display_year: 2024,
            default_start_year: 2020,
            default_end_year: 2021,
            max_leading_fill_days: Some(7),
            top_years: 5,
            volatility_ddof: 1,
        }
    }
}

impl SeasonalityConfig {
    /// Load a JSON config; omitted fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if !is_leap_year(self.display_year) {
            return Err(SeasonalityError::InvalidConfig(format!(
                "display_year {} is not a leap year",
                self.display_year
            )));
        }
        if self.default_start_year > self.default_end_year {
            return Err(SeasonalityError::InvalidConfig(format!(
                "default window {}..{} is inverted",
                self.default_start_year, self.default_end_year
            )));
        }
        if self.volatility_ddof > 1 {
            return Err(SeasonalityError::InvalidConfig(format!(
                "volatility_ddof must be 0 or 1, got {}",
                self.volatility_ddof
            )));
        }
        Ok(())
    }

    /// Window used when a request gives no years.
    pub fn default_window(&self) -> Result<DateWindow> {
        DateWindow::from_years(self.default_start_year, self.default_end_year)
    }

    /// Window for optional request years, falling back to the defaults.
    pub fn window(&self, start_year: Option<i32>, end_year: Option<i32>) -> Result<DateWindow> {
        DateWindow::from_years(
            start_year.unwrap_or(self.default_start_year),
            end_year.unwrap_or(self.default_end_year),
        )
    }
}
