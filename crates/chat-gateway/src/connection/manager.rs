//! Connection manager
//!
//! Registry of live connections with two indexes: user → sessions and
//! channel → sessions. Each index entry is mutated atomically through the
//! `DashMap` entry API. Delivery works on a snapshot of the target
//! connections, so no map guard is held while frames are queued, and
//! connections found closed during delivery are removed afterwards.

use super::Connection;
use crate::protocol::Frame;
use chat_core::Snowflake;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Manages all active WebSocket connections
pub struct ConnectionManager {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// User ID to session IDs mapping
    user_connections: DashMap<Snowflake, HashSet<String>>,

    /// Channel ID to session IDs mapping
    channel_connections: DashMap<Snowflake, HashSet<String>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            channel_connections: DashMap::new(),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection for a verified user
    pub fn add_connection(
        &self,
        session_id: String,
        user_id: Snowflake,
        sender: mpsc::Sender<Frame>,
    ) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), user_id, sender);
        self.connections.insert(session_id.clone(), connection.clone());
        self.user_connections
            .entry(user_id)
            .or_default()
            .insert(session_id.clone());

        tracing::debug!(session_id = %session_id, user_id = %user_id, "Connection added");

        connection
    }

    /// Remove a connection from the registry and every index
    pub fn remove_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        let (_, connection) = self.connections.remove(session_id)?;

        detach(&self.user_connections, connection.user_id(), session_id);
        for channel_id in connection.channels() {
            detach(&self.channel_connections, channel_id, session_id);
        }

        tracing::debug!(session_id = %session_id, "Connection removed");
        Some(connection)
    }

    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    /// Subscribe one session to a channel; `false` if the session is gone
    pub fn subscribe(&self, session_id: &str, channel_id: Snowflake) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };

        if connection.subscribe_channel(channel_id) {
            self.channel_connections
                .entry(channel_id)
                .or_default()
                .insert(session_id.to_string());

            tracing::trace!(
                session_id = %session_id,
                channel_id = %channel_id,
                "Connection subscribed to channel"
            );
        }
        true
    }

    /// Unsubscribe one session from a channel
    pub fn unsubscribe(&self, session_id: &str, channel_id: Snowflake) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };

        if connection.unsubscribe_channel(channel_id) {
            detach(&self.channel_connections, channel_id, session_id);
        }
        true
    }

    /// Subscribe every session of a user to a channel; returns the count
    pub fn subscribe_user(&self, user_id: Snowflake, channel_id: Snowflake) -> usize {
        self.user_sessions(user_id)
            .iter()
            .filter(|sid| self.subscribe(sid, channel_id))
            .count()
    }

    /// Unsubscribe every session of a user from a channel; returns the count
    pub fn unsubscribe_user(&self, user_id: Snowflake, channel_id: Snowflake) -> usize {
        self.user_sessions(user_id)
            .iter()
            .filter(|sid| self.unsubscribe(sid, channel_id))
            .count()
    }

    /// Get all connections for a user
    pub fn get_user_connections(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.resolve(&self.user_sessions(user_id))
    }

    /// Get all connections subscribed to a channel
    pub fn get_channel_connections(&self, channel_id: Snowflake) -> Vec<Arc<Connection>> {
        let sessions: Vec<String> = self
            .channel_connections
            .get(&channel_id)
            .map(|sessions| sessions.iter().cloned().collect())
            .unwrap_or_default();
        self.resolve(&sessions)
    }

    /// Deliver a frame to every connection subscribed to a channel
    pub fn broadcast_to_channel(&self, channel_id: Snowflake, frame: &Frame) -> usize {
        let sent = self.deliver(self.get_channel_connections(channel_id), frame);

        tracing::trace!(
            channel_id = %channel_id,
            frame_type = %frame.frame_type,
            sent = sent,
            "Frame sent to channel connections"
        );

        sent
    }

    /// Deliver a frame to every connection of a user
    pub fn send_to_user(&self, user_id: Snowflake, frame: &Frame) -> usize {
        let sent = self.deliver(self.get_user_connections(user_id), frame);

        tracing::trace!(user_id = %user_id, sent = sent, "Frame sent to user connections");

        sent
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of unique connected users
    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    /// Get the number of channels with subscribed connections
    pub fn channel_count(&self) -> usize {
        self.channel_connections.len()
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }

    fn user_sessions(&self, user_id: Snowflake) -> Vec<String> {
        self.user_connections
            .get(&user_id)
            .map(|sessions| sessions.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn resolve(&self, sessions: &[String]) -> Vec<Arc<Connection>> {
        sessions
            .iter()
            .filter_map(|sid| self.get_connection(sid))
            .collect()
    }

    /// Queue `frame` on each connection. A full queue drops the frame for
    /// that connection only; a closed one is removed after the pass.
    fn deliver(&self, targets: Vec<Arc<Connection>>, frame: &Frame) -> usize {
        let mut sent = 0;
        let mut closed = Vec::new();

        for conn in targets {
            match conn.try_send(frame.clone()) {
                Ok(()) => sent += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        session_id = %conn.session_id(),
                        frame_type = %frame.frame_type,
                        "Outbound queue full, dropping frame"
                    );
                }
                Err(TrySendError::Closed(_)) => closed.push(conn.session_id().to_string()),
            }
        }

        for session_id in &closed {
            self.remove_connection(session_id);
        }
        if !closed.is_empty() {
            tracing::info!(count = closed.len(), "Removed closed connections");
        }

        sent
    }
}

/// Drop `session_id` from one index entry, removing the entry once empty
fn detach(index: &DashMap<Snowflake, HashSet<String>>, key: Snowflake, session_id: &str) {
    if let Some(mut sessions) = index.get_mut(&key) {
        sessions.remove(session_id);
    }
    index.remove_if(&key, |_, sessions| sessions.is_empty());
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .field("channels", &self.channel_connections.len())
            .finish()
    }
}
