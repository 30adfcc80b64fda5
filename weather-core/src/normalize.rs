//! Reshapes upstream OpenWeather documents into a [`NormalizedReport`].
//!
//! Every upstream field is optional. Missing values never make this fail:
//! - `feels_like`, `high` and `low` fall back to the temperature, not to 0
//! - a missing wind speed stays `None` so clients can tell "no data" from calm air
//! - missing text becomes an empty string, missing icons stay `None`

use chrono::{DateTime, Utc};

use crate::model::{
    Condition, CurrentConditions, Forecast, ForecastEntry, ForecastSlot, NormalizedReport,
};

/// Upper bound on forecast slots in a report (24 hours of 3-hour steps).
pub const FORECAST_SLOTS: usize = 8;

const MPS_TO_KMH: f64 = 3.6;

pub fn normalize(current: &CurrentConditions, forecast: &Forecast) -> NormalizedReport {
    let main = current.main.clone().unwrap_or_default();

    let temperature = round1(main.temp.unwrap_or(0.0));
    let feels_like = main.feels_like.map_or(temperature, round1);
    let high = main.temp_max.map_or(temperature, round1);
    let low = main.temp_min.map_or(temperature, round1);

    let wind_speed_kmh = current
        .wind
        .as_ref()
        .and_then(|w| w.speed)
        .map(|mps| round1(mps * MPS_TO_KMH));

    let condition = first_condition(current.weather.as_deref());

    let offset = current.timezone.unwrap_or(0);
    let local = local_clock(current.dt.unwrap_or(0), offset);

    let forecast = forecast
        .list
        .as_deref()
        .unwrap_or_default()
        .iter()
        .take(FORECAST_SLOTS)
        .map(|entry| forecast_slot(entry, offset))
        .collect();

    NormalizedReport {
        city: current.name.clone(),
        temperature,
        feels_like,
        high,
        low,
        humidity: main.humidity,
        pressure: main.pressure,
        wind_speed_kmh,
        description: title_case(condition.description.as_deref().unwrap_or_default()),
        icon: condition.icon,
        forecast,
        local_time: local.format("%H:%M").to_string(),
        local_date: local.format("%d %b %Y").to_string(),
    }
}

fn forecast_slot(entry: &ForecastEntry, offset: i64) -> ForecastSlot {
    let condition = first_condition(entry.weather.as_deref());
    let temp = entry.main.as_ref().and_then(|m| m.temp).unwrap_or(0.0);

    ForecastSlot {
        time: local_clock(entry.dt.unwrap_or(0), offset).format("%H:%M").to_string(),
        temp: round1(temp),
        icon: condition.icon,
        description: title_case(condition.description.as_deref().unwrap_or_default()),
    }
}

fn first_condition(weather: Option<&[Condition]>) -> Condition {
    weather.and_then(|w| w.first()).cloned().unwrap_or_default()
}

/// Wall-clock time at the location. The offset is added to the timestamp
/// and the result is read as UTC; no further zone conversion happens.
fn local_clock(dt: i64, offset: i64) -> DateTime<Utc> {
    dt.checked_add(offset)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
}

/// Rounds to one decimal from the exact binary value, so 12.35 (stored as
/// 12.3499...) gives 12.3. Scaling by 10 first would round that up.
fn round1(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Upper-cases the first letter of every run of letters and lower-cases the rest,
/// so "light-rain" becomes "Light-Rain".
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
