//! HTTP layer of the weather proxy.
//!
//! Exposes `/weather` and `/weather/coords`, both answering with a
//! [`weather_core::NormalizedReport`] or a `{"error": "..."}` body.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
