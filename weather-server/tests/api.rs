//! Integration tests for the HTTP routes
#![allow(clippy::expect_used)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use weather_core::{
    CurrentConditions, Forecast, Location, OpenWeatherProvider, ProviderError, UpstreamWeather,
    WeatherProvider,
};
use weather_server::{AppState, create_router};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

/// Provider returning canned documents and recording what it was asked.
#[derive(Debug, Default)]
struct StubProvider {
    current: Value,
    forecast: Value,
    not_found: bool,
    calls: AtomicUsize,
    last: std::sync::Mutex<Option<Location>>,
}

impl StubProvider {
    fn with(current: Value, forecast: Value) -> Self {
        Self { current, forecast, ..Default::default() }
    }

    fn not_found() -> Self {
        Self { not_found: true, ..Default::default() }
    }
}

#[async_trait]
impl WeatherProvider for StubProvider {
    async fn fetch(&self, location: &Location) -> Result<UpstreamWeather, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().expect("lock") = Some(location.clone());

        if self.not_found {
            return Err(ProviderError::Status {
                endpoint: "weather",
                status: StatusCode::NOT_FOUND,
                body: r#"{"cod":"404","message":"city not found"}"#.to_string(),
            });
        }

        let current: CurrentConditions =
            serde_json::from_value(self.current.clone()).expect("current fixture");
        let forecast: Forecast =
            serde_json::from_value(self.forecast.clone()).expect("forecast fixture");
        Ok(UpstreamWeather { current, forecast })
    }
}

fn paris_current() -> Value {
    json!({
        "name": "Paris",
        "dt": 0,
        "timezone": 0,
        "main": {"temp": 21.04, "humidity": 40, "pressure": 1015},
        "weather": [{"description": "clear sky", "icon": "01d"}],
        "wind": {"speed": 10.0}
    })
}

fn forecast_of(n: usize) -> Value {
    let list: Vec<_> = (0..n)
        .map(|i| json!({"dt": (i as i64) * 10_800, "main": {"temp": 20.0}, "weather": []}))
        .collect();
    json!({"list": list})
}

fn router_with(provider: StubProvider) -> (Router, Arc<StubProvider>) {
    let provider = Arc::new(provider);
    let router = create_router(AppState::new(provider.clone()));
    (router, provider)
}

async fn send(router: Router, method: Method, uri: &str) -> Response {
    router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router is infallible")
}

async fn get(router: Router, uri: &str) -> Response {
    send(router, Method::GET, uri).await
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn weather_by_city_returns_normalized_report() {
    let (router, provider) = router_with(StubProvider::with(paris_current(), forecast_of(10)));

    let response = get(router, "/weather?city=Paris").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["city"], "Paris");
    assert_eq!(body["temperature"], 21.0);
    assert_eq!(body["feels_like"], 21.0);
    assert_eq!(body["high"], 21.0);
    assert_eq!(body["low"], 21.0);
    assert_eq!(body["humidity"], 40);
    assert_eq!(body["pressure"], 1015);
    assert_eq!(body["wind_speed"], 36.0);
    assert_eq!(body["description"], "Clear Sky");
    assert_eq!(body["icon"], "01d");
    assert_eq!(body["local_time"], "00:00");
    assert_eq!(body["local_date"], "01 Jan 1970");
    assert_eq!(body["forecast"].as_array().map(Vec::len), Some(8));
    assert_eq!(
        body["forecast"][1],
        json!({"time": "03:00", "temp": 20.0, "icon": null, "description": ""})
    );

    assert_eq!(
        *provider.last.lock().expect("lock"),
        Some(Location::City("Paris".to_string()))
    );
}

#[tokio::test]
async fn missing_wind_is_null_in_response() {
    let (router, _) = router_with(StubProvider::with(json!({"name": "Calm"}), json!({})));

    let body = body_json(get(router, "/weather?city=Calm").await).await;
    assert!(body["wind_speed"].is_null());
    assert!(body["forecast"].as_array().expect("array").is_empty());
}

#[tokio::test]
async fn unknown_city_is_404_with_only_error_field() {
    let (router, _) = router_with(StubProvider::not_found());

    let response = get(router, "/weather?city=Atlantis").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "City not found"}));
}

#[tokio::test]
async fn unknown_coordinates_report_location_not_found() {
    let (router, _) = router_with(StubProvider::not_found());

    let response = get(router, "/weather/coords?lat=0&lon=0").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "Location not found"}));
}

#[tokio::test]
async fn coordinates_are_passed_to_provider() {
    let (router, provider) = router_with(StubProvider::with(paris_current(), forecast_of(1)));

    let response = get(router, "/weather/coords?lat=48.85&lon=-2.35").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        *provider.last.lock().expect("lock"),
        Some(Location::Coordinates { lat: 48.85, lon: -2.35 })
    );
}

#[tokio::test]
async fn hyphenated_coords_path_is_an_alias() {
    let (router, _) = router_with(StubProvider::with(paris_current(), forecast_of(1)));

    let response = get(router, "/weather-coords?lat=48.85&lon=2.35").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_api_key_is_500_without_upstream_call() {
    let router = create_router(AppState::unconfigured());

    let response = get(router, "/weather?city=Paris").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({"error": "Missing OpenWeather API key"}));
}

#[tokio::test]
async fn bad_queries_are_400_and_skip_upstream() {
    for uri in [
        "/weather",
        "/weather?city=",
        "/weather?city=%20%20",
        "/weather/coords?lat=abc&lon=1",
        "/weather/coords?lat=1",
        "/weather/coords?lat=95&lon=0",
    ] {
        let (router, provider) = router_with(StubProvider::with(paris_current(), json!({})));

        let response = get(router, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

        let body = body_json(response).await;
        assert!(body["error"].is_string(), "{uri}");
        assert_eq!(body.as_object().map(|o| o.len()), Some(1), "{uri}");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0, "{uri}");
    }
}

#[tokio::test]
async fn unknown_path_is_invalid_endpoint() {
    let (router, _) = router_with(StubProvider::default());

    let response = get(router, "/forecast").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "Invalid endpoint"}));
}

#[tokio::test]
async fn bare_options_returns_permissive_headers_and_no_body() {
    for uri in ["/weather", "/weather/coords", "/weather-coords", "/anything"] {
        let (router, provider) = router_with(StubProvider::default());

        let response = send(router, Method::OPTIONS, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert!(bytes.is_empty(), "{uri}");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0, "{uri}");
    }
}

#[tokio::test]
async fn browser_preflight_is_answered_by_cors_layer() {
    let (router, _) = router_with(StubProvider::default());

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/weather?city=Paris")
                .header(header::ORIGIN, "https://example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-requested-with")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router is infallible");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
}

#[tokio::test]
async fn cross_origin_get_carries_allow_origin() {
    let (router, _) = router_with(StubProvider::with(paris_current(), json!({})));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/weather?city=Paris")
                .header(header::ORIGIN, "https://example.com")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router is infallible");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn end_to_end_through_openweather_provider() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Reykjavik"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Reykjavik",
            "dt": 1_700_000_000,
            "timezone": 0,
            "main": {"temp": -1.26, "feels_like": -6.8},
            "weather": [{"description": "light snow", "icon": "13n"}],
            "wind": {"speed": 7.2}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_of(3)))
        .mount(&server)
        .await;

    let provider =
        OpenWeatherProvider::new("TEST_KEY".into(), server.uri(), Duration::from_secs(5))
            .expect("provider");
    let router = create_router(AppState::new(Arc::new(provider)));

    let response = get(router, "/weather?city=Reykjavik").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["temperature"], -1.3);
    assert_eq!(body["feels_like"], -6.8);
    assert_eq!(body["high"], -1.3);
    assert_eq!(body["wind_speed"], 25.9);
    assert_eq!(body["description"], "Light Snow");
    assert_eq!(body["local_time"], "22:13");
    assert_eq!(body["local_date"], "14 Nov 2023");
}

#[tokio::test]
async fn end_to_end_upstream_failure_is_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"cod": 401})))
        .mount(&server)
        .await;

    let provider =
        OpenWeatherProvider::new("BAD_KEY".into(), server.uri(), Duration::from_secs(5))
            .expect("provider");
    let router = create_router(AppState::new(Arc::new(provider)));

    let response = get(router, "/weather?city=Paris").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "City not found"}));
}
