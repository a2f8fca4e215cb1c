//! Seasonal aggregations over an aligned daily series.
//!
//! Price seasonality rebases each year to its Jan-1 close, volume seasonality
//! rebases monthly volume to January, volatility and cumulative volume report
//! raw per-year statistics.

pub mod cumulative;
pub mod price;
pub mod volatility;
pub mod volume;

pub use cumulative::{CumulativeVolume, CumulativeVolumeTable};
pub use price::{PriceSeasonality, SeasonalityTable};
pub use volatility::{MonthlyVolatility, MonthlyVolatilityConfig, VolatilityTable};
pub use volume::{VolumeSeasonality, VolumeSeasonalityTable};

use crate::{
    Result, SeasonalityError,
    calendar::CalendarDay,
    table::{RowKey, YearTable},
};

/// Reference value a year is rebased against.
///
/// # Errors
///
/// [`SeasonalityError::MissingAnchor`] when absent,
/// [`SeasonalityError::InvalidAnchor`] when not a positive finite number.
pub(crate) fn anchor_for(year: i32, anchor: Option<f64>) -> Result<f64> {
    match anchor {
        None => Err(SeasonalityError::MissingAnchor { year }),
        Some(value) if value.is_finite() && value > 0.0 => Ok(value),
        Some(value) => Err(SeasonalityError::InvalidAnchor { year, value }),
    }
}

/// Record `err` as an exclusion of `year` when it only concerns that year.
///
/// # Errors
///
/// Returns `err` unchanged when it is not a per-year condition.
pub(crate) fn exclude_or_fail<K: RowKey>(
    table: &mut YearTable<K>,
    year: i32,
    err: SeasonalityError,
) -> Result<()> {
    match err.exclusion_reason() {
        Some(reason) => {
            table.exclude(year, reason);
            Ok(())
        }
        None => Err(err),
    }
}

/// Calendar slot of a `(month, day)` pair read from a frame.
pub(crate) fn day_slot(month: Option<i32>, day: Option<i32>) -> Option<usize> {
    let month = u32::try_from(month?).ok()?;
    let day = u32::try_from(day?).ok()?;
    CalendarDay::new(month, day).map(|d| d.slot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_for() {
        assert!(matches!(anchor_for(2020, Some(75.0)), Ok(v) if v == 75.0));
        assert!(matches!(
            anchor_for(2020, None),
            Err(SeasonalityError::MissingAnchor { year: 2020 })
        ));
        assert!(matches!(
            anchor_for(2020, Some(0.0)),
            Err(SeasonalityError::InvalidAnchor { year: 2020, .. })
        ));
        assert!(anchor_for(2020, Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_day_slot() {
        assert_eq!(day_slot(Some(1), Some(1)), Some(0));
        assert_eq!(day_slot(Some(3), Some(1)), Some(60));
        assert_eq!(day_slot(Some(2), Some(30)), None);
        assert_eq!(day_slot(None, Some(1)), None);
    }
}
