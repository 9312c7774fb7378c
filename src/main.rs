mod config;
mod lights;
mod routes;
mod state;
mod weather;
mod ws;

use clap::Parser;
use tokio::net::TcpListener;

use config::{generate_config_template, Cli, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Handle --generate-config: print template and exit
    if cli.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load(cli)?;

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "garland_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "garland_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("Garland hub v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(led_count = config.led_count, "Installation size");
    if config.weather.is_none() {
        tracing::info!("Weather lookups disabled (no [weather] config section)");
    }

    // Build application state
    let app_state = state::AppState::new(config.led_count, config.weather.clone());

    // Build router
    let app = routes::build_router(app_state);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
