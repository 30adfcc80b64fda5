use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Number;

/// What the caller asked the proxy to look up.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::City(name) => f.write_str(name),
            Location::Coordinates { lat, lon } => write!(f, "{lat},{lon}"),
        }
    }
}

/// Both upstream documents needed to build one report.
#[derive(Debug, Clone, Default)]
pub struct UpstreamWeather {
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

/// Deserialize an optional field, treating `null` and values of the wrong
/// JSON type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Upstream "current conditions" document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentConditions {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub main: Option<MainReadings>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather: Option<Vec<Condition>>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind: Option<Wind>,
    /// Observation time, unix seconds (UTC).
    #[serde(default, deserialize_with = "lenient")]
    pub dt: Option<i64>,
    /// Shift from UTC in seconds for the queried location.
    #[serde(default, deserialize_with = "lenient")]
    pub timezone: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainReadings {
    #[serde(default, deserialize_with = "lenient")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub feels_like: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temp_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub temp_min: Option<f64>,
    /// Passed through as sent, integer or float.
    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<Number>,
    #[serde(default, deserialize_with = "lenient")]
    pub pressure: Option<Number>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Condition {
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wind {
    /// Metres per second.
    #[serde(default, deserialize_with = "lenient")]
    pub speed: Option<f64>,
}

/// Upstream forecast document (3-hour steps).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Forecast {
    #[serde(default, deserialize_with = "lenient")]
    pub list: Option<Vec<ForecastEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub dt: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub main: Option<MainReadings>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather: Option<Vec<Condition>>,
}

/// Client-facing weather document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReport {
    pub city: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub high: f64,
    pub low: f64,
    pub humidity: Option<Number>,
    pub pressure: Option<Number>,
    /// `None` means the provider sent no wind data, which is not the same as calm air.
    #[serde(rename = "wind_speed")]
    pub wind_speed_kmh: Option<f64>,
    pub description: String,
    pub icon: Option<String>,
    pub forecast: Vec<ForecastSlot>,
    pub local_time: String,
    pub local_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSlot {
    pub time: String,
    pub temp: f64,
    pub icon: Option<String>,
    pub description: String,
}
