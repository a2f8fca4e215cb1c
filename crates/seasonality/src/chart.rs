//! Chart records for dashboards and JSON endpoints.
//!
//! Tables are flattened into `{date, ...}` records whose dates are pinned to
//! a single leap display year, so a chart x-axis runs Jan-1..Dec-31 no matter
//! which years fed the table.

use crate::{
    aggregations::SeasonalityTable,
    table::{RowKey, YearTable},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One point of a chart: a display date plus named values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRecord {
    /// Date relabelled onto the display year, `YYYY-MM-DD`
    pub date: String,
    /// Series name to value
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

/// Output shaping applied to a price seasonality table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// Every included year plus `mean`
    #[default]
    Full,
    /// Only the mean, under the `index` field
    MeanOnly,
    /// The mean plus the `n` most recent years keyed `1st`, `2nd`, ...
    TopRecent(usize),
}

impl OutputShape {
    /// Shape `table` into chart records.
    pub fn render(&self, table: &SeasonalityTable, display_year: i32) -> Vec<ChartRecord> {
        match *self {
            Self::Full => full_records(table, display_year),
            Self::MeanOnly => mean_records(table, display_year, "index"),
            Self::TopRecent(n) => top_recent_records(table, n, display_year),
        }
    }
}

/// One record per row with a field per included year and, if present, `mean`.
pub fn full_records<K: RowKey>(table: &YearTable<K>, display_year: i32) -> Vec<ChartRecord> {
    if table.is_empty() {
        return Vec::new();
    }

    table
        .keys()
        .iter()
        .map(|key| {
            let mut values: BTreeMap<String, Option<f64>> = table
                .years()
                .iter()
                .map(|year| (year.to_string(), table.value(*key, *year)))
                .collect();
            if table.mean().is_some() {
                values.insert("mean".to_string(), table.mean_at(*key));
            }
            ChartRecord {
                date: key.label(display_year),
                values,
            }
        })
        .collect()
}

/// One record per row carrying only the mean, under `field`.
pub fn mean_records<K: RowKey>(
    table: &YearTable<K>,
    display_year: i32,
    field: &str,
) -> Vec<ChartRecord> {
    if table.is_empty() {
        return Vec::new();
    }

    table
        .keys()
        .iter()
        .map(|key| ChartRecord {
            date: key.label(display_year),
            values: BTreeMap::from([(field.to_string(), table.mean_at(*key))]),
        })
        .collect()
}

/// The mean plus the `n` most recent years ranked newest first.
///
/// Ranks without a year, and rows where a ranked year has no value, report `0.0`.
pub fn top_recent_records<K: RowKey>(
    table: &YearTable<K>,
    n: usize,
    display_year: i32,
) -> Vec<ChartRecord> {
    if table.is_empty() {
        return Vec::new();
    }

    let recent = table.recent_years(n);
    table
        .keys()
        .iter()
        .map(|key| {
            let mut values = BTreeMap::from([("mean".to_string(), table.mean_at(*key))]);
            for rank in 1..=n {
                let value = recent
                    .get(rank - 1)
                    .and_then(|year| table.value(*key, *year))
                    .unwrap_or(0.0);
                values.insert(ordinal(rank), Some(value));
            }
            ChartRecord {
                date: key.label(display_year),
                values,
            }
        })
        .collect()
}

/// English ordinal: `1st`, `2nd`, `3rd`, `4th`, ..., `11th`, `21st`.
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
