use crate::config::WeatherConfig;
use crate::lights::state::{LedColors, LedPositions};
use crate::ws::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Authoritative per-LED colors, written only by the command boundary
    pub colors: LedColors,
    /// Calibrated 3D positions reported by controllers
    pub positions: LedPositions,
    /// Active WebSocket connections
    pub connections: ConnectionRegistry,
    /// Upstream weather lookup settings, when configured
    pub weather: Option<WeatherConfig>,
    /// Shared HTTP client for the weather lookup
    pub http: reqwest::Client,
}

impl AppState {
    /// Build a fresh hub state for an installation of `led_count` LEDs.
    pub fn new(led_count: usize, weather: Option<WeatherConfig>) -> Self {
        Self {
            colors: LedColors::new(led_count),
            positions: LedPositions::new(),
            connections: ConnectionRegistry::new(),
            weather,
            http: reqwest::Client::new(),
        }
    }
}
