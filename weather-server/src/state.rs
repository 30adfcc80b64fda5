//! Application state shared across handlers

use std::sync::Arc;

use weather_core::WeatherProvider;

use crate::error::ApiError;

/// Shared application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// `None` when the server was started without an API key.
    provider: Option<Arc<dyn WeatherProvider>>,
}

impl AppState {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider: Some(provider) }
    }

    /// State for a server with no API key: every lookup fails before going upstream.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn provider(&self) -> Result<&dyn WeatherProvider, ApiError> {
        self.provider.as_deref().ok_or(ApiError::MissingApiKey)
    }
}
