//! Route definitions

use axum::{
    Router,
    http::Method,
    routing::get,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowMethods, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::handle_panic, handlers, state::AppState};

/// Create the router with all routes and middleware
///
/// The CORS layer answers every OPTIONS request itself, with or without an
/// `Access-Control-Request-Method` header, so no route registers OPTIONS.
pub fn create_router(state: AppState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(AllowMethods::list([Method::GET, Method::OPTIONS]))
        .allow_headers(Any);

    Router::new()
        .route("/weather", get(handlers::weather_by_city))
        .route("/weather/coords", get(handlers::weather_by_coords))
        // Older clients call the hyphenated path.
        .route("/weather-coords", get(handlers::weather_by_coords))
        .fallback(handlers::invalid_endpoint)
        .with_state(state)
        // Order matters: last added = outermost
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
}
