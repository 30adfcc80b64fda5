//! API error handling
//!
//! Every failure becomes a `{"error": "<message>"}` body. Internal details are
//! logged, never returned.

use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use weather_core::ProviderError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing OpenWeather API key")]
    MissingApiKey,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a provider failure. Any lookup failure is reported as `not_found`,
    /// whatever the upstream cause was.
    pub fn from_provider(err: ProviderError, not_found: &str) -> Self {
        if err.is_lookup_failure() {
            warn!(error = %err, "Upstream lookup failed");
            Self::NotFound(not_found.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::MissingApiKey => {
                error!("Request rejected: no OpenWeather API key configured");
                (StatusCode::INTERNAL_SERVER_ERROR, "Missing OpenWeather API key".to_string())
            }
            Self::Internal(detail) => {
                error!(%detail, "Internal error while serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Turns a handler panic into the same structured 500 as any other internal error.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());

    ApiError::Internal(detail).into_response()
}
