//! Request-scoped entry point tying a data source to the aggregations.
//!
//! Each call fetches the ticker's observations for the window, aligns them,
//! and runs one aggregation. Nothing is cached between calls.

use crate::{
    DailySeries, DateWindow, Result, SeasonalityConfig, SeasonalityError,
    aggregations::{
        CumulativeVolume, CumulativeVolumeTable, MonthlyVolatility, MonthlyVolatilityConfig,
        PriceSeasonality, SeasonalityTable, VolatilityTable, VolumeSeasonality,
        VolumeSeasonalityTable,
    },
    chart::{ChartRecord, OutputShape, full_records, mean_records},
    risk::RiskSummary,
    source::DataSource,
    traits::ConfigurableAggregation,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which table a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Report {
    /// Price seasonality in the given shape
    Price(OutputShape),
    /// Mean January-rebased monthly volume, under `volume`
    Volume,
    /// Monthly volatility per year
    Volatility,
    /// Year-to-date volume per year
    CumulativeVolume,
}

/// Seasonality engine over a data source.
#[derive(Debug)]
pub struct SeasonalityEngine<S> {
    source: S,
    config: SeasonalityConfig,
}

impl<S: DataSource> SeasonalityEngine<S> {
    /// Create an engine after validating `config`.
    pub fn new(source: S, config: SeasonalityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Create an engine with the default configuration.
    pub fn with_default_config(source: S) -> Self {
        Self {
            source,
            config: SeasonalityConfig::default(),
        }
    }

    /// Engine configuration.
    pub const fn config(&self) -> &SeasonalityConfig {
        &self.config
    }

    /// Underlying data source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and align `ticker` over `window`.
    pub fn load(&self, ticker: &str, window: DateWindow) -> Result<DailySeries> {
        info!(ticker, start = %window.start(), end = %window.end(), "loading series");
        let raw = self.source.fetch(ticker, window.start(), window.end())?;
        if raw.height() == 0 {
            return Err(SeasonalityError::unavailable(ticker, "source returned no rows"));
        }
        DailySeries::align(&raw, window, self.config.max_leading_fill_days)
    }

    /// Price seasonality table.
    pub fn price_seasonality(&self, ticker: &str, window: DateWindow) -> Result<SeasonalityTable> {
        PriceSeasonality::new().table(&self.load(ticker, window)?)
    }

    /// January-rebased monthly volume table.
    pub fn volume_seasonality(
        &self,
        ticker: &str,
        window: DateWindow,
    ) -> Result<VolumeSeasonalityTable> {
        VolumeSeasonality::new().table(&self.load(ticker, window)?)
    }

    /// Monthly volatility table.
    pub fn monthly_volatility(&self, ticker: &str, window: DateWindow) -> Result<VolatilityTable> {
        self.volatility().table(&self.load(ticker, window)?)
    }

    /// Year-to-date volume table.
    pub fn cumulative_volume(
        &self,
        ticker: &str,
        window: DateWindow,
    ) -> Result<CumulativeVolumeTable> {
        CumulativeVolume::new().table(&self.load(ticker, window)?)
    }

    /// Return and risk statistics with per-year returns.
    pub fn risk_summary(
        &self,
        ticker: &str,
        window: DateWindow,
        risk_free_rate: f64,
    ) -> Result<RiskSummary> {
        let series = self.load(ticker, window)?;
        let table = PriceSeasonality::new().table(&series)?;
        RiskSummary::from_series(&series, &table, risk_free_rate)
    }

    /// Chart records for `report`, dated on the configured display year.
    pub fn records(
        &self,
        ticker: &str,
        window: DateWindow,
        report: Report,
    ) -> Result<Vec<ChartRecord>> {
        let series = self.load(ticker, window)?;
        let display_year = self.config.display_year;

        let records = match report {
            Report::Price(shape) => {
                shape.render(&PriceSeasonality::new().table(&series)?, display_year)
            }
            Report::Volume => mean_records(
                &VolumeSeasonality::new().table(&series)?,
                display_year,
                "volume",
            ),
            Report::Volatility => full_records(&self.volatility().table(&series)?, display_year),
            Report::CumulativeVolume => {
                full_records(&CumulativeVolume::new().table(&series)?, display_year)
            }
        };
        Ok(records)
    }

    fn volatility(&self) -> MonthlyVolatility {
        MonthlyVolatility::with_config(MonthlyVolatilityConfig {
            ddof: self.config.volatility_ddof,
        })
    }
}
