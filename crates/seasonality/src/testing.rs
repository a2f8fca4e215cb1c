//! Shared fixtures for unit tests.

use crate::{DailySeries, DateWindow};
use chrono::{Datelike, NaiveDate, Weekday};
use polars::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Raw frame from `(date, close, volume)` rows.
pub(crate) fn raw_frame(rows: &[(&str, f64, f64)]) -> DataFrame {
    df![
        "date" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "close" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "volume" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
    ]
    .unwrap()
}

/// Raw frame with one row per calendar day, priced by `price(date)` and `volume(date)`.
pub(crate) fn daily_raw_frame(
    window: DateWindow,
    price: impl Fn(NaiveDate) -> f64,
    volume: impl Fn(NaiveDate) -> f64,
) -> DataFrame {
    let days: Vec<_> = window.days().collect();
    df![
        "date" => days.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "close" => days.iter().map(|d| price(*d)).collect::<Vec<_>>(),
        "volume" => days.iter().map(|d| volume(*d)).collect::<Vec<_>>(),
    ]
    .unwrap()
}

/// Weekday-only random walk with seeded noise.
pub(crate) fn random_walk_frame(window: DateWindow, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0;
    let mut dates = Vec::new();
    let mut closes = Vec::new();
    let mut volumes = Vec::new();

    for day in window.days() {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        price *= 1.0 + rng.gen_range(-0.02..0.02);
        dates.push(day.to_string());
        closes.push(price);
        volumes.push(rng.gen_range(1_000.0..5_000.0_f64).round());
    }

    df![
        "date" => dates,
        "close" => closes,
        "volume" => volumes,
    ]
    .unwrap()
}

/// Align a raw frame over whole years without a fill limit.
pub(crate) fn aligned(raw: &DataFrame, start_year: i32, end_year: i32) -> DailySeries {
    let window = DateWindow::from_years(start_year, end_year).unwrap();
    DailySeries::align(raw, window, None).unwrap()
}

/// Calendar dates of a `Date` column.
pub(crate) fn date_values(df: &DataFrame, name: &str) -> Vec<Option<NaiveDate>> {
    df.column(name).unwrap().date().unwrap().as_date_iter().collect()
}
