//! Request handlers for the weather endpoints.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use tracing::{info, instrument};
use weather_core::{Location, NormalizedReport, normalize};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct CoordsQuery {
    pub lat: f64,
    pub lon: f64,
}

impl CoordsQuery {
    fn into_location(self) -> Result<Location, ApiError> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(ApiError::BadRequest(
                "Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180"
                    .to_string(),
            ));
        }
        Ok(Location::Coordinates { lat: self.lat, lon: self.lon })
    }
}

/// GET /weather?city=<name>
#[instrument(skip_all)]
pub async fn weather_by_city(
    State(state): State<AppState>,
    query: Result<Query<CityQuery>, QueryRejection>,
) -> Result<Json<NormalizedReport>, ApiError> {
    let Query(CityQuery { city }) = query
        .map_err(|_| ApiError::BadRequest("Missing 'city' query parameter".to_string()))?;

    let city = city.trim();
    if city.is_empty() {
        return Err(ApiError::BadRequest("City name must not be empty".to_string()));
    }

    report(&state, Location::City(city.to_string()), "City not found").await
}

/// GET /weather/coords?lat=<f64>&lon=<f64>
#[instrument(skip_all)]
pub async fn weather_by_coords(
    State(state): State<AppState>,
    query: Result<Query<CoordsQuery>, QueryRejection>,
) -> Result<Json<NormalizedReport>, ApiError> {
    let Query(coords) = query.map_err(|_| {
        ApiError::BadRequest("Query parameters 'lat' and 'lon' must be numbers".to_string())
    })?;

    report(&state, coords.into_location()?, "Location not found").await
}

async fn report(
    state: &AppState,
    location: Location,
    not_found: &str,
) -> Result<Json<NormalizedReport>, ApiError> {
    let provider = state.provider()?;

    let upstream = provider
        .fetch(&location)
        .await
        .map_err(|e| ApiError::from_provider(e, not_found))?;

    let report = normalize(&upstream.current, &upstream.forecast);
    info!(%location, city = ?report.city, "Served weather report");

    Ok(Json(report))
}

pub async fn invalid_endpoint() -> ApiError {
    ApiError::NotFound("Invalid endpoint".to_string())
}
