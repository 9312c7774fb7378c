use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
/// WebSocket upgrade endpoint. Connections are anonymous: controllers and
/// web UIs present nothing at the handshake, and the hub treats them
/// identically from then on. On upgrade, spawns an actor for the connection.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_connected(socket, state))
}

/// Handle an upgraded WebSocket connection by running the actor.
async fn handle_connected(socket: WebSocket, state: AppState) {
    actor::run_connection(socket, state).await;
}
