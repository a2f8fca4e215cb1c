//! Calendar primitives shared by every aggregation.
//!
//! Years of different length are compared on a common leap-year calendar of
//! 366 day slots, so Feb-29 always has a position and March 1st lands on the
//! same slot whether or not its own year was a leap year.

use crate::{Result, SeasonalityError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Leap year whose ordinal positions define the calendar slots.
pub const REFERENCE_LEAP_YEAR: i32 = 2016;

/// Number of day slots in the reference calendar.
pub const CALENDAR_SLOTS: usize = 366;

/// Returns true for Gregorian leap years.
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// A `(month, day)` pair on the leap-normalized calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarDay {
    month: u32,
    day: u32,
}

impl CalendarDay {
    /// January 1st, the anchor slot of every year.
    pub const JAN_1: Self = Self { month: 1, day: 1 };

    /// Creates a calendar day, returning `None` if it does not exist in a leap year.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, month, day).map(|_| Self { month, day })
    }

    /// Calendar day of a concrete date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Calendar day at a zero-based slot, `None` past Dec-31.
    pub fn from_slot(slot: usize) -> Option<Self> {
        let ordinal = u32::try_from(slot).ok()?.checked_add(1)?;
        NaiveDate::from_yo_opt(REFERENCE_LEAP_YEAR, ordinal).map(Self::from_date)
    }

    /// All 366 slots, Jan-1 through Dec-31.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..CALENDAR_SLOTS).filter_map(Self::from_slot)
    }

    /// Month number (1-12).
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Day of month.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Zero-based slot on the reference calendar.
    pub fn slot(&self) -> usize {
        NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, self.month, self.day)
            .map_or(0, |d| d.ordinal0() as usize)
    }

    /// The concrete date of this slot in `year`; `None` for Feb-29 outside leap years.
    pub fn on_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }

    /// Chart label pinned to `display_year`, e.g. `2024-03-01`.
    pub fn label(&self, display_year: i32) -> String {
        format!("{display_year:04}-{:02}-{:02}", self.month, self.day)
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Month of year used as the row key of the monthly tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Month(u32);

impl Month {
    const NAMES: [&'static str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// January.
    pub const JANUARY: Self = Self(1);

    /// Creates a month from its number (1-12).
    pub const fn new(number: u32) -> Option<Self> {
        if number >= 1 && number <= 12 {
            Some(Self(number))
        } else {
            None
        }
    }

    /// All twelve months in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=12).map(Self)
    }

    /// Month number (1-12).
    pub const fn number(&self) -> u32 {
        self.0
    }

    /// Zero-based index.
    pub const fn index(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// Chart label on the first day of the month in `display_year`.
    pub fn label(&self, display_year: i32) -> String {
        format!("{display_year:04}-{:02}-01", self.0)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::NAMES[self.index()])
    }
}

/// Inclusive range of calendar dates requested from a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(SeasonalityError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Jan-1 of `start_year` through Dec-31 of `end_year`.
    pub fn from_years(start_year: i32, end_year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1);
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31);
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(SeasonalityError::InvalidDateRange {
                start: start_year.to_string(),
                end: end_year.to_string(),
            }),
        }
    }

    /// First day of the window.
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window.
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days, both ends included.
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every calendar day of the window in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}
