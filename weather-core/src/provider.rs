use crate::{
    Config, Location, ProviderError, UpstreamWeather, provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of the raw current-conditions and forecast documents.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, location: &Location) -> Result<UpstreamWeather, ProviderError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: set {} or run `weather-server configure`.",
            crate::config::ENV_API_KEY
        )
    })?;

    OpenWeatherProvider::new(
        api_key.to_owned(),
        config.openweather.base_url.clone(),
        std::time::Duration::from_secs(config.openweather.timeout_secs),
    )
}
