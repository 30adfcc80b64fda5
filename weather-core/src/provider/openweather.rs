use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    Location, ProviderError,
    model::{CurrentConditions, Forecast, UpstreamWeather},
};

use super::WeatherProvider;

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn query_params(&self, location: &Location) -> Vec<(&'static str, String)> {
        let mut params = match location {
            Location::City(name) => vec![("q", name.clone())],
            Location::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        location: &Location,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, %location, "Requesting OpenWeather data");

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(location))
            .send()
            .await
            .map_err(|source| ProviderError::Request { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| ProviderError::Request { endpoint, source })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ProviderError::Parse { endpoint, source })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip_all, fields(location = %location))]
    async fn fetch(&self, location: &Location) -> Result<UpstreamWeather, ProviderError> {
        let (current, forecast) = tokio::try_join!(
            self.get_json::<CurrentConditions>(CURRENT_ENDPOINT, location),
            self.get_json::<Forecast>(FORECAST_ENDPOINT, location),
        )?;

        Ok(UpstreamWeather { current, forecast })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenWeatherProvider {
        OpenWeatherProvider::new(
            "KEY".into(),
            "http://localhost/data/2.5/".into(),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(provider().base_url, "http://localhost/data/2.5");
    }

    #[test]
    fn city_query_params() {
        let params = provider().query_params(&Location::City("São Paulo".into()));
        assert_eq!(
            params,
            vec![
                ("q", "São Paulo".to_string()),
                ("appid", "KEY".to_string()),
                ("units", "metric".to_string()),
            ]
        );
    }

    #[test]
    fn coordinate_query_params() {
        let params = provider().query_params(&Location::Coordinates { lat: 51.5, lon: -0.12 });
        assert_eq!(params[0], ("lat", "51.5".to_string()));
        assert_eq!(params[1], ("lon", "-0.12".to_string()));
        assert_eq!(params[3], ("units", "metric".to_string()));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let short = "city not found";
        assert_eq!(truncate_body(short), short);

        let long = "é".repeat(150);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
    }
}
