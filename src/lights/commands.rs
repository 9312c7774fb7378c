//! The HTTP command boundary: decode, validate, apply, broadcast.
//!
//! Commands mutate the authoritative color map and fan out to every
//! connection. Controller-originated frames never take this path, so the
//! store stays writable only from here.

use std::collections::HashMap;
use std::fmt;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::ws::broadcast::broadcast_to_all;

/// A validated external command. The discriminator is the wire `type`
/// field; each kind carries only its own payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LightCommand {
    /// Set one LED to a color.
    #[serde(rename = "update")]
    Update { led: i64, color: String },

    /// Set every LED in the installation to a color.
    #[serde(rename = "updateAll")]
    UpdateAll { color: String },

    /// Start or stop a named pattern on the controllers. The hub stores
    /// nothing for this; controllers own animation playback.
    #[serde(rename = "animation")]
    Animation { action: String, name: String },
}

/// Why a command was refused. Every variant is the caller's fault and maps
/// to a 400 at the HTTP boundary; the distinction exists for reporting.
#[derive(Debug)]
pub enum CommandError {
    /// The body decoded but the command cannot be applied.
    Validation(String),
    /// The discriminator names no known command kind.
    UnknownCommand(String),
    /// The body is not valid JSON, or not the shape its kind requires.
    Decode(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Validation(msg) => write!(f, "{}", msg),
            CommandError::UnknownCommand(kind) => write!(f, "unknown command type: {}", kind),
            CommandError::Decode(msg) => write!(f, "invalid command body: {}", msg),
        }
    }
}

/// Decode a raw request body into a command.
///
/// Classification: a body that is not JSON is `Decode`; JSON without a
/// usable `type` field is `Validation`; a `type` naming no command kind is
/// `UnknownCommand`; a known kind with the wrong payload shape is `Decode`.
pub fn parse_command(body: &[u8]) -> Result<LightCommand, CommandError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| CommandError::Decode(e.to_string()))?;

    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| CommandError::Validation("missing command type".to_owned()))?;

    match kind.as_str() {
        "update" | "updateAll" | "animation" => {
            serde_json::from_value(value).map_err(|e| CommandError::Decode(e.to_string()))
        }
        _ => Err(CommandError::UnknownCommand(kind)),
    }
}

/// Validate a command against the installation, apply its state change, and
/// fan its canonical envelope out to every connection. Validation happens
/// before any mutation, so a refused command leaves the store untouched.
pub fn apply_command(state: &AppState, command: &LightCommand) -> Result<(), CommandError> {
    match command {
        LightCommand::Update { led, color } => {
            let count = state.colors.led_count() as i64;
            if *led < 0 || *led >= count {
                return Err(CommandError::Validation(format!(
                    "LED index {} out of range (installation has {} LEDs)",
                    led, count
                )));
            }
            state.colors.set(*led as usize, color);
        }
        LightCommand::UpdateAll { color } => {
            state.colors.set_all(color);
        }
        LightCommand::Animation { action, name } => {
            tracing::info!(action = %action, name = %name, "Relaying animation command");
        }
    }

    broadcast_command(state, command);
    Ok(())
}

/// Serialize the command's canonical envelope and broadcast it. Commands
/// originate outside the connection set, so no connection is excluded.
pub fn broadcast_command(state: &AppState, command: &LightCommand) {
    if let Ok(envelope) = serde_json::to_string(command) {
        broadcast_to_all(&state.connections, &envelope);
        tracing::debug!(total = state.connections.len(), "Command broadcast");
    }
}

/// POST /api/updateLights
/// Decode one command from the body, apply it, and broadcast it. Refused
/// commands answer 400 with the reason; nothing is broadcast for them.
pub async fn update_lights(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let command = parse_command(&body).map_err(command_rejection)?;
    apply_command(&state, &command).map_err(command_rejection)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/getStates
/// Full color snapshot, keyed by LED index. Read-only; the late-joining web
/// UI bootstraps from this instead of a connection-time push.
pub async fn get_states(State(state): State<AppState>) -> Json<HashMap<usize, String>> {
    Json(state.colors.snapshot())
}

fn command_rejection(err: CommandError) -> (StatusCode, Json<serde_json::Value>) {
    tracing::warn!(error = %err, "Rejected light command");
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
}
