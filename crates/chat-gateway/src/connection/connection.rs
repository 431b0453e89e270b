//! Individual WebSocket connection
//!
//! The user is verified before the upgrade, so a connection is always
//! authenticated. Outbound frames go through a bounded queue drained by the
//! connection's send task.

use crate::protocol::Frame;
use chat_core::Snowflake;
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// A single WebSocket connection
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// Verified user behind the socket
    user_id: Snowflake,

    /// Queue drained by the send task
    sender: mpsc::Sender<Frame>,

    /// Channels this connection receives events for
    channels: RwLock<HashSet<Snowflake>>,

    /// Last frame or pong received from the peer
    last_activity: Mutex<Instant>,

    created_at: Instant,
}

impl Connection {
    pub fn new(session_id: String, user_id: Snowflake, sender: mpsc::Sender<Frame>) -> Arc<Self> {
        let now = Instant::now();
        Arc::new(Self {
            session_id,
            user_id,
            sender,
            channels: RwLock::new(HashSet::new()),
            last_activity: Mutex::new(now),
            created_at: now,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    /// Add a channel subscription; `false` if it already existed
    pub fn subscribe_channel(&self, channel_id: Snowflake) -> bool {
        self.channels.write().insert(channel_id)
    }

    /// Remove a channel subscription; `false` if there was none
    pub fn unsubscribe_channel(&self, channel_id: Snowflake) -> bool {
        self.channels.write().remove(&channel_id)
    }

    /// Get all subscribed channels
    pub fn channels(&self) -> Vec<Snowflake> {
        self.channels.read().iter().copied().collect()
    }

    pub fn is_subscribed_to(&self, channel_id: Snowflake) -> bool {
        self.channels.read().contains(&channel_id)
    }

    /// Record that the peer is alive
    pub fn record_activity(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    /// Time since the peer was last heard from
    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue a frame, waiting for room in the queue
    pub async fn send(&self, frame: Frame) -> Result<(), mpsc::error::SendError<Frame>> {
        self.sender.send(frame).await
    }

    /// Queue a frame without waiting (used by fan-out)
    pub fn try_send(&self, frame: Frame) -> Result<(), mpsc::error::TrySendError<Frame>> {
        self.sender.try_send(frame)
    }

    /// Check if the send task has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("channels", &self.channels.read().len())
            .field("created_at", &self.created_at)
            .finish()
    }
}
