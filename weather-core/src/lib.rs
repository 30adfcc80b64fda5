//! Core library for the weather proxy.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream provider abstraction and its OpenWeather implementation
//! - Upstream and client-facing models, and the normalizer between them
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;

pub use config::Config;
pub use error::ProviderError;
pub use model::{
    CurrentConditions, Forecast, ForecastSlot, Location, NormalizedReport, UpstreamWeather,
};
pub use normalize::normalize;
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
