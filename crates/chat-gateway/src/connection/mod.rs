//! Connection management
//!
//! Live WebSocket connections and the indexes used to route frames to them.

mod connection;
mod manager;

pub use connection::Connection;
pub use manager::ConnectionManager;

/// Generate a new session ID
#[must_use]
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
