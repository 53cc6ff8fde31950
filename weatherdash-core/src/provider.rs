use crate::{
    Config, FetchError,
    model::{ForecastSnapshot, LocationQuery, WeatherSnapshot},
    provider::weatherstack::WeatherstackProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherstack;

/// A remote source of current conditions and multi-day forecasts.
///
/// Implementations must be cancel-safe: dropping a returned future abandons
/// the request without side effects.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &LocationQuery) -> Result<WeatherSnapshot, FetchError>;

    async fn forecast(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<ForecastSnapshot, FetchError>;
}

/// Construct the weatherstack provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    if !config.has_api_key() {
        tracing::warn!("no API key configured; weather requests will be rejected");
    }

    let provider = WeatherstackProvider::builder(config.api_key_or_empty())
        .base_url(&config.weather_base_url)
        .timeout(config.timeout())
        .build()?;

    Ok(Arc::new(provider))
}
