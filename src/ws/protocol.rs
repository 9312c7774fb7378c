use std::collections::HashMap;

use serde::Deserialize;

use crate::state::AppState;
use crate::ws::broadcast::broadcast_to_others;
use crate::ws::ConnectionId;

/// Envelope for messages arriving on a connection. JSON text frames,
/// discriminated by the `type` field. Anything with an unrecognized
/// discriminator lands in `Unknown` and is ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    /// A controller reporting the colors it is currently showing, keyed by
    /// LED index (encoded as a string, the way controllers send it).
    #[serde(rename = "states")]
    States { states: HashMap<String, String> },

    /// Per-LED acknowledgment from a controller.
    #[serde(rename = "status")]
    Status {
        #[serde(default)]
        led: i64,
        #[serde(default)]
        color: String,
        #[serde(default)]
        success: bool,
    },

    /// Calibrated 3D coordinates, carried as a JSON array encoded in a
    /// string (controllers send the array pre-serialized).
    #[serde(rename = "positions")]
    Positions { positions: String },

    #[serde(other)]
    Unknown,
}

/// One record inside a `positions` payload.
#[derive(Debug, Deserialize)]
pub struct PositionRecord {
    pub id: i64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Handle one inbound text frame from `conn_id`.
///
/// Frames that do not decode are dropped without closing the connection.
/// Controller `states` reports are relayed to the other connections
/// verbatim; they are never merged into the authoritative color map, which
/// only the HTTP command boundary writes.
pub fn handle_text_message(text: &str, conn_id: ConnectionId, state: &AppState) {
    let msg = match serde_json::from_str::<Inbound>(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(conn_id, error = %e, "Dropping undecodable frame");
            return;
        }
    };

    match msg {
        Inbound::States { states } => {
            tracing::debug!(conn_id, leds = states.len(), "Relaying controller state report");
            broadcast_to_others(&state.connections, conn_id, text);
        }
        Inbound::Status { led, color, success } => {
            tracing::info!(conn_id, led, color = %color, success, "Controller status");
        }
        Inbound::Positions { positions } => {
            handle_positions(&positions, conn_id, state);
        }
        Inbound::Unknown => {
            tracing::debug!(conn_id, "Ignoring frame with unrecognized type");
        }
    }
}

/// Parse a `positions` payload, store every record, and relay the payload
/// string unchanged so downstream consumers see the original encoding.
fn handle_positions(raw: &str, conn_id: ConnectionId, state: &AppState) {
    let records: Vec<PositionRecord> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(conn_id, error = %e, "Dropping unparseable positions payload");
            return;
        }
    };

    for rec in &records {
        state.positions.set(rec.id, rec.x, rec.y, rec.z);
    }
    tracing::debug!(conn_id, count = records.len(), "Stored LED positions");

    let envelope = serde_json::json!({ "type": "positions", "positions": raw });
    broadcast_to_others(&state.connections, conn_id, &envelope.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ws::Message;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn test_state() -> AppState {
        AppState::new(8, None)
    }

    fn attach_peer(state: &AppState) -> (ConnectionId, UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (state.connections.register(tx), rx)
    }

    fn recv_text(rx: &mut UnboundedReceiver<Message>) -> Option<String> {
        match rx.try_recv() {
            Ok(Message::Text(text)) => Some(text.to_string()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn states_relayed_verbatim_and_never_stored() {
        let state = test_state();
        let (origin, mut origin_rx) = attach_peer(&state);
        let (_peer, mut peer_rx) = attach_peer(&state);

        let raw = r##"{"type":"states","states":{"0":"#ff0000","5":"blue"}}"##;
        handle_text_message(raw, origin, &state);

        assert_eq!(recv_text(&mut peer_rx).as_deref(), Some(raw));
        assert!(origin_rx.try_recv().is_err());
        assert!(state.colors.snapshot().is_empty());
    }

    #[tokio::test]
    async fn positions_stored_and_rewrapped() {
        let state = test_state();
        let (origin, _origin_rx) = attach_peer(&state);
        let (_peer, mut peer_rx) = attach_peer(&state);

        let inner = r#"[{"id":1,"x":1.0,"y":2.0,"z":3.0},{"id":7,"x":-0.5,"y":0.25,"z":4.5}]"#;
        let frame = serde_json::json!({ "type": "positions", "positions": inner }).to_string();
        handle_text_message(&frame, origin, &state);

        assert_eq!(state.positions.len(), 2);
        let p = state.positions.get(7).unwrap();
        assert_eq!((p.x, p.y, p.z), (-0.5, 0.25, 4.5));

        let relayed: serde_json::Value =
            serde_json::from_str(&recv_text(&mut peer_rx).unwrap()).unwrap();
        assert_eq!(relayed["type"], "positions");
        assert_eq!(relayed["positions"], inner);
    }

    #[tokio::test]
    async fn bad_positions_payload_is_dropped() {
        let state = test_state();
        let (origin, _origin_rx) = attach_peer(&state);
        let (_peer, mut peer_rx) = attach_peer(&state);

        let frame = r#"{"type":"positions","positions":"not an array"}"#;
        handle_text_message(frame, origin, &state);

        assert!(state.positions.is_empty());
        assert!(peer_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn status_and_unknown_frames_are_not_relayed() {
        let state = test_state();
        let (origin, _origin_rx) = attach_peer(&state);
        let (_peer, mut peer_rx) = attach_peer(&state);

        handle_text_message(
            r##"{"type":"status","led":3,"color":"#00ff00","success":true}"##,
            origin,
            &state,
        );
        handle_text_message(r#"{"type":"mystery","blob":42}"#, origin, &state);
        handle_text_message("definitely not json", origin, &state);

        assert!(peer_rx.try_recv().is_err());
    }

    #[test]
    fn status_fields_default_when_absent() {
        let msg: Inbound = serde_json::from_str(r#"{"type":"status"}"#).unwrap();
        match msg {
            Inbound::Status { led, color, success } => {
                assert_eq!(led, 0);
                assert_eq!(color, "");
                assert!(!success);
            }
            other => panic!("expected status, got {:?}", other),
        }
    }
}
