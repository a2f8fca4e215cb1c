//! Return and risk statistics over a price history.
//!
//! Companion measures to the seasonality tables: compound growth, dispersion,
//! risk-adjusted return and worst peak-to-trough loss.

use crate::{
    DailySeries, Result, SeasonalityError, aggregations::SeasonalityTable, series::CLOSE,
};
use polars::prelude::*;
use serde::Serialize;
use tracing::warn;

/// Calendar days per year for the aligned daily series.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

const VALUE: &str = "value";

/// Non-null values of `values`, as a single `Float64` column.
fn value_frame(values: &Series) -> Result<LazyFrame> {
    let values = values
        .cast(&DataType::Float64)?
        .drop_nulls()
        .with_name(VALUE.into());
    Ok(DataFrame::new(vec![Column::from(values)])?.lazy())
}

/// Reduce `values` to one `Float64` row, one column per named expression.
fn aggregate(values: &Series, exprs: Vec<Expr>) -> Result<DataFrame> {
    Ok(value_frame(values)?.select(exprs).collect()?)
}

fn scalar(frame: &DataFrame, name: &str) -> Result<Option<f64>> {
    Ok(frame.column(name)?.cast(&DataType::Float64)?.f64()?.get(0))
}

fn require(values: &Series, required: usize) -> Result<usize> {
    let available = values.len() - values.null_count();
    if available < required {
        return Err(SeasonalityError::InsufficientData {
            required,
            available,
        });
    }
    Ok(available)
}

/// Compound annual growth rate of a price path sampled `periods_per_year` times a year.
///
/// Formula: `(last / first)^(periods_per_year / n) - 1`, as a decimal. Nulls
/// are skipped.
pub fn cagr(prices: &Series, periods_per_year: f64) -> Result<f64> {
    let n = require(prices, 2)?;
    let ends = aggregate(
        prices,
        vec![
            col(VALUE).first().alias("first"),
            col(VALUE).last().alias("last"),
        ],
    )?;

    match (scalar(&ends, "first")?, scalar(&ends, "last")?) {
        (Some(first), Some(last)) if first > 0.0 => {
            Ok((last / first).powf(periods_per_year / n as f64) - 1.0)
        }
        (first, _) => Err(SeasonalityError::Computation(format!(
            "initial price must be positive, got {first:?}"
        ))),
    }
}

/// Population standard deviation (divides by `n`), skipping nulls.
pub fn population_std(values: &Series) -> Result<f64> {
    require(values, 1)?;
    let std = aggregate(values, vec![col(VALUE).std(0)])?;
    scalar(&std, VALUE)?
        .ok_or_else(|| SeasonalityError::Computation("standard deviation undefined".to_string()))
}

/// Per-period rate equivalent to an annual rate compounded `periods` times.
pub fn deannualize(annual_rate: f64, periods: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / periods) - 1.0
}

/// Largest peak-to-trough decline, in percent of the running peak.
pub fn max_drawdown(values: &Series) -> Result<f64> {
    require(values, 1)?;
    let ratio_to_peak = col(VALUE) / col(VALUE).cum_max(false);
    let drawdown = aggregate(
        values,
        vec![(lit(100.0) * (lit(1.0) - ratio_to_peak.min())).alias(VALUE)],
    )?;
    scalar(&drawdown, VALUE)?
        .ok_or_else(|| SeasonalityError::Computation("drawdown undefined".to_string()))
}

/// Simple returns between consecutive non-null prices.
pub fn period_returns(prices: &Series) -> Result<Series> {
    let returns = value_frame(prices)?
        .select([col(VALUE).pct_change(lit(1))])
        .collect()?;
    Ok(returns.column(VALUE)?.as_materialized_series().drop_nulls())
}

/// Annualized Sharpe ratio of a price path against an annual risk-free rate.
///
/// Formula: `(cagr - rf) / (σ_period × sqrt(periods_per_year))` with σ the
/// population standard deviation of period returns.
pub fn sharpe_ratio(prices: &Series, risk_free_rate: f64, periods_per_year: f64) -> Result<f64> {
    let growth = cagr(prices, periods_per_year)?;
    let volatility = population_std(&period_returns(prices)?)? * periods_per_year.sqrt();
    if volatility == 0.0 {
        return Err(SeasonalityError::Computation(
            "zero volatility, Sharpe ratio undefined".to_string(),
        ));
    }
    Ok((growth - risk_free_rate) / volatility)
}

/// Full-year return of an included year, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualReturn {
    /// Calendar year
    pub year: i32,
    /// Dec-31 value of the rebased column
    pub return_pct: f64,
}

/// Year-end rebased value of every included year.
pub fn annual_returns(table: &SeasonalityTable) -> Vec<AnnualReturn> {
    table
        .years()
        .iter()
        .filter_map(|year| {
            let last = table.column(*year)?.iter().rev().find_map(|v| *v)?;
            Some(AnnualReturn {
                year: *year,
                return_pct: last,
            })
        })
        .collect()
}

/// Risk statistics of an aligned daily series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    /// Compound annual growth rate (decimal)
    pub cagr: f64,
    /// Annualized population standard deviation of daily returns (decimal)
    pub volatility: f64,
    /// Annualized Sharpe ratio
    pub sharpe_ratio: Option<f64>,
    /// Maximum drawdown (percent)
    pub max_drawdown: f64,
    /// Per-year returns (percent) from the seasonality table
    pub annual_returns: Vec<AnnualReturn>,
}

impl RiskSummary {
    /// Summarize the filled closes of `series`.
    ///
    /// `table` supplies the per-year returns so exclusions match the
    /// seasonality output.
    pub fn from_series(
        series: &DailySeries,
        table: &SeasonalityTable,
        risk_free_rate: f64,
    ) -> Result<Self> {
        let prices = series.frame().column(CLOSE)?.as_materialized_series();
        let volatility = population_std(&period_returns(prices)?)? * CALENDAR_DAYS_PER_YEAR.sqrt();
        let sharpe = match sharpe_ratio(prices, risk_free_rate, CALENDAR_DAYS_PER_YEAR) {
            Ok(ratio) => Some(ratio),
            Err(error) => {
                warn!(%error, "Sharpe ratio not reported");
                None
            }
        };

        Ok(Self {
            cagr: cagr(prices, CALENDAR_DAYS_PER_YEAR)?,
            volatility,
            sharpe_ratio: sharpe,
            max_drawdown: max_drawdown(prices)?,
            annual_returns: annual_returns(table),
        })
    }
}
