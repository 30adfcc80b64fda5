use reqwest::StatusCode;
use thiserror::Error;

/// Failures while talking to the upstream weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The provider answered 2xx but the body was not the expected document.
    #[error("failed to parse {endpoint} response: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    /// True when the location itself is the likely problem rather than our side.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, ProviderError::Request { .. } | ProviderError::Status { .. })
    }
}
