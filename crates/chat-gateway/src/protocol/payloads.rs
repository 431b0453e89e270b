//! Frame payloads
//!
//! Inbound payloads are validated with `validator` before they reach a
//! service; outbound payloads for channel events are the `chat-service`
//! response DTOs.

use chat_core::Snowflake;
use chat_service::UserSummary;
use serde::{Deserialize, Serialize};
use validator::Validate;

// === Client Payloads ===

/// `message`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MessagePayload {
    #[validate(length(min = 1, max = 4000, message = "content must be 1-4000 characters"))]
    pub content: String,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub parent_message_id: Option<Snowflake>,
}

/// `add_reaction` / `remove_reaction`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReactionPayload {
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    #[validate(length(min = 1, max = 64, message = "reaction_type must be 1-64 characters"))]
    pub reaction_type: String,
}

/// `typing_start` / `typing_stop`
#[derive(Debug, Clone, Deserialize)]
pub struct TypingPayload {
    pub channel_id: Snowflake,
}

// === Server Payloads ===

#[derive(Debug, Clone, Serialize)]
pub struct ConnectedPayload {
    pub session_id: String,
    pub user_id: Snowflake,
}

/// `error`: a summary of what failed plus the underlying reason
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    pub error: String,
    /// Stable machine-readable code when the failure came from a service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Typing indicator fanned out to the channel
#[derive(Debug, Clone, Serialize)]
pub struct TypingEvent {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}
