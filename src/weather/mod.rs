//! Weather-triggered animations: look up current conditions for a city and
//! relay the matching animation command through the normal command path.

use std::fmt;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::lights::commands::{broadcast_command, LightCommand};
use crate::state::AppState;

/// Request body for POST /api/weather.
#[derive(Debug, Deserialize)]
pub struct WeatherRequest {
    pub city: String,
}

/// The slice of the OpenWeather current-weather response the hub reads.
#[derive(Debug, Deserialize)]
struct WeatherResponse {
    weather: Vec<WeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    main: String,
}

#[derive(Debug)]
pub enum WeatherError {
    /// No `[weather]` section in the config.
    NotConfigured,
    /// The request body was not `{"city": ...}`.
    Decode(String),
    /// The upstream lookup failed or returned something unusable.
    Upstream(String),
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherError::NotConfigured => write!(f, "weather lookups are not configured"),
            WeatherError::Decode(msg) => write!(f, "invalid weather request: {}", msg),
            WeatherError::Upstream(msg) => write!(f, "weather lookup failed: {}", msg),
        }
    }
}

/// Map an OpenWeather condition group to a controller animation name.
/// Anything unrecognized (Clouds, Mist, Haze, ...) falls back to `clear`.
pub fn animation_for_condition(condition: &str) -> &'static str {
    match condition {
        "Rain" | "Drizzle" => "rain",
        "Snow" => "snow",
        "Thunderstorm" => "lightning",
        _ => "clear",
    }
}

/// POST /api/weather
/// Look up current conditions for the requested city and broadcast the
/// matching `animation` command to every connection. Answers 500 when no
/// weather config is present and 502 when the upstream lookup fails.
pub async fn weather_trigger(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let request: WeatherRequest = serde_json::from_slice(&body)
        .map_err(|e| weather_rejection(WeatherError::Decode(e.to_string())))?;

    let config = state
        .weather
        .as_ref()
        .ok_or_else(|| weather_rejection(WeatherError::NotConfigured))?;

    let condition = fetch_condition(&state.http, &config.base_url, &config.api_key, &request.city)
        .await
        .map_err(weather_rejection)?;

    let animation = animation_for_condition(&condition);
    let command = LightCommand::Animation {
        action: "start".to_owned(),
        name: animation.to_owned(),
    };
    broadcast_command(&state, &command);

    tracing::info!(
        city = %request.city,
        condition = %condition,
        animation = %animation,
        "Weather animation relayed"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "weather": condition,
        "animation": animation,
    })))
}

/// Query the current-weather endpoint and return the primary condition
/// group (`Rain`, `Snow`, `Clear`, ...).
async fn fetch_condition(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    city: &str,
) -> Result<String, WeatherError> {
    let response = client
        .get(base_url)
        .query(&[("q", city), ("appid", api_key)])
        .send()
        .await
        .map_err(|e| WeatherError::Upstream(format!("request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(WeatherError::Upstream(format!(
            "weather service returned {}",
            status
        )));
    }

    let data: WeatherResponse = response
        .json()
        .await
        .map_err(|e| WeatherError::Upstream(format!("response parse failed: {}", e)))?;

    data.weather
        .first()
        .map(|w| w.main.clone())
        .ok_or_else(|| WeatherError::Upstream("no conditions reported".to_owned()))
}

fn weather_rejection(err: WeatherError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        WeatherError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        WeatherError::Decode(_) => StatusCode::BAD_REQUEST,
        WeatherError::Upstream(_) => StatusCode::BAD_GATEWAY,
    };
    tracing::warn!(error = %err, "Weather trigger failed");
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_precipitation_groups_to_animations() {
        assert_eq!(animation_for_condition("Rain"), "rain");
        assert_eq!(animation_for_condition("Drizzle"), "rain");
        assert_eq!(animation_for_condition("Snow"), "snow");
        assert_eq!(animation_for_condition("Thunderstorm"), "lightning");
    }

    #[test]
    fn unrecognized_conditions_fall_back_to_clear() {
        assert_eq!(animation_for_condition("Clear"), "clear");
        assert_eq!(animation_for_condition("Clouds"), "clear");
        assert_eq!(animation_for_condition("Haze"), "clear");
        assert_eq!(animation_for_condition(""), "clear");
    }

    #[test]
    fn reads_the_primary_condition_from_the_response() {
        let raw = r#"{"weather":[{"id":500,"main":"Rain","description":"light rain"}],"name":"Bergen"}"#;
        let parsed: WeatherResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.weather.first().unwrap().main, "Rain");
    }
}
