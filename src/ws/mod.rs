//! WebSocket plumbing: the connection registry, the per-connection actor,
//! the inbound protocol, and fan-out helpers.

pub mod actor;
pub mod broadcast;
pub mod handler;
pub mod protocol;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

/// Sender half of a connection's outbound channel. The connection's writer
/// task owns the socket; everything else reaches the peer through this.
pub type ConnectionSender = mpsc::UnboundedSender<Message>;

/// Handle identifying one live connection. Ids come from a process-wide
/// counter and are never reused.
pub type ConnectionId = u64;

/// Live set of WebSocket connections. Peers are anonymous: the id exists so
/// fan-out can skip the originator and so unregister stays idempotent.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<ConnectionId, ConnectionSender>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection and return its handle.
    pub fn register(&self, sender: ConnectionSender) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections.insert(id, sender);
        id
    }

    /// Remove a connection. Removing an id that is already gone is a no-op,
    /// so the read loop's cleanup and a failed-delivery sweep can race.
    pub fn unregister(&self, id: ConnectionId) {
        self.connections.remove(&id);
    }

    /// Visit every connection except `origin` (all of them when `origin` is
    /// `None`). `f` returning false marks that peer unreachable; it is
    /// unregistered after the sweep without interrupting the others.
    ///
    /// Removals are collected first to avoid mutating the map while
    /// iterating it.
    pub fn for_each_except<F>(&self, origin: Option<ConnectionId>, mut f: F)
    where
        F: FnMut(ConnectionId, &ConnectionSender) -> bool,
    {
        let mut dead = Vec::new();
        for entry in self.connections.iter() {
            let id = *entry.key();
            if Some(id) == origin {
                continue;
            }
            if !f(id, entry.value()) {
                dead.push(id);
            }
        }
        for id in dead {
            self.unregister(id);
            tracing::debug!(conn_id = id, "Pruned unreachable connection");
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
