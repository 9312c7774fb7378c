use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::lights::commands;
use crate::state::AppState;
use crate::weather;
use crate::ws::handler as ws_handler;

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // The web UI is served from elsewhere, so the whole API is cross-origin.
    // There is no origin policy here; anything fronting the hub adds one.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Command ingress and state snapshot
    let api_routes = Router::new()
        .route(
            "/api/updateLights",
            axum::routing::post(commands::update_lights),
        )
        .route("/api/getStates", axum::routing::get(commands::get_states))
        .route("/api/weather", axum::routing::post(weather::weather_trigger));

    // WebSocket endpoint (anonymous, no handshake auth)
    let ws_routes = Router::new().route("/ws", axum::routing::get(ws_handler::ws_upgrade));

    // Health check
    let health = Router::new().route("/health", axum::routing::get(health_check));

    Router::new()
        .merge(api_routes)
        .merge(ws_routes)
        .merge(health)
        .layer(cors)
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
