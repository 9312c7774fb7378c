use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Garland LED relay hub
///
/// Flags the user does not pass serialize to nothing, so the CLI layer
/// only overrides the file and environment where a flag was actually given.
#[derive(Parser, Serialize, Clone, Debug)]
#[command(name = "garland-server", version, about = "Relay hub for a networked LED installation")]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "GARLAND_PORT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(long, env = "GARLAND_BIND_ADDRESS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,

    /// Path to TOML config file
    #[arg(long, default_value = "./garland.toml")]
    #[serde(skip)]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "GARLAND_JSON_LOGS")]
    #[serde(skip_serializing_if = "flag_is_off")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    #[serde(skip)]
    pub generate_config: bool,

    /// Number of LEDs in the installation; update commands must target [0, led_count)
    #[arg(long, env = "GARLAND_LED_COUNT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_count: Option<usize>,
}

/// Resolved configuration after every layer has merged.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Bind address
    pub bind_address: String,

    /// Enable structured JSON logging (for Docker/production)
    pub json_logs: bool,

    /// Number of LEDs in the installation
    pub led_count: usize,

    /// Weather lookup configuration (loaded from [weather] section in TOML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherConfig>,
}

/// Configuration for the upstream weather lookup behind POST /api/weather.
/// Without this section the endpoint answers 500.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather API key
    pub api_key: String,

    /// Current-weather endpoint (default: the public OpenWeather API)
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn flag_is_off(flag: &bool) -> bool {
    !*flag
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            json_logs: false,
            led_count: 40,
            weather: None,
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (GARLAND_*) < CLI args
    pub fn load(cli: Cli) -> Result<Self, figment::Error> {
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("GARLAND_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Garland LED Relay Hub Configuration
# Place this file at ./garland.toml or specify with --config <path>
# All settings can be overridden via environment variables (GARLAND_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 8080)
# port = 8080

# Bind address (default: 0.0.0.0, all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Number of LEDs in the installation (default: 40)
# Single-LED update commands must target an index in [0, led_count)
# led_count = 40

# ---- Weather-Triggered Animations ----
# Without this section, POST /api/weather answers 500.
# [weather]

# OpenWeather API key
# api_key = ""

# Current-weather endpoint (override when testing against a stub)
# base_url = "https://api.openweathermap.org/data/2.5/weather"
"#
    .to_string()
}
