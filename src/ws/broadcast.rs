use axum::extract::ws::Message;

use super::{ConnectionId, ConnectionRegistry};

/// Broadcast a text frame to every connection. Used for messages that
/// originate outside the connection set (the HTTP command boundary).
pub fn broadcast_to_all(registry: &ConnectionRegistry, payload: &str) {
    send_except(registry, None, payload);
}

/// Broadcast a text frame to every connection except the originator. Used
/// when relaying a frame one peer sent, so it never echoes back.
pub fn broadcast_to_others(registry: &ConnectionRegistry, origin: ConnectionId, payload: &str) {
    send_except(registry, Some(origin), payload);
}

fn send_except(registry: &ConnectionRegistry, origin: Option<ConnectionId>, payload: &str) {
    let msg = Message::Text(payload.to_owned().into());
    registry.for_each_except(origin, |_, sender| sender.send(msg.clone()).is_ok());
}
