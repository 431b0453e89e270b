//! Request DTOs for API endpoints and gateway commands
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chat_core::Snowflake;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Channel Requests
// ============================================================================

/// Create channel request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Channel name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1024, message = "Topic must be at most 1024 characters"))]
    pub topic: Option<String>,
}

/// Change channel topic request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTopicRequest {
    #[validate(length(max = 1024, message = "Topic must be at most 1024 characters"))]
    pub topic: String,
}

/// Move the caller's read marker; defaults to now
#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct MarkReadRequest {
    pub at: Option<DateTime<Utc>>,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Create message request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub content: String,

    /// Message being replied to
    #[serde(default)]
    pub parent_message_id: Option<Snowflake>,
}

/// Message posted on behalf of an integration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    pub integration_id: Snowflake,

    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub content: String,
}

/// Message history query
#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct MessageHistoryQuery {
    /// Only messages with a smaller id
    pub before: Option<Snowflake>,

    #[validate(range(min = 1, max = 100, message = "limit must be 1-100"))]
    pub limit: Option<usize>,
}

impl MessageHistoryQuery {
    pub const DEFAULT_LIMIT: usize = 50;

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

// ============================================================================
// Reaction Requests
// ============================================================================

/// Add or remove reaction command
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReactionRequest {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,

    #[validate(length(min = 1, max = 64, message = "Reaction type must be 1-64 characters"))]
    pub reaction_type: String,
}

// ============================================================================
// Invite Requests
// ============================================================================

/// Create invite request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInviteRequest {
    /// Max age in seconds (0 = never expires, default = 86400)
    #[serde(default = "default_invite_max_age")]
    #[validate(range(min = 0, message = "max_age must not be negative"))]
    pub max_age: i64,

    /// Max number of uses (0 = unlimited, default = 0)
    #[serde(default)]
    #[validate(range(min = 0, message = "max_uses must not be negative"))]
    pub max_uses: i32,
}

impl Default for CreateInviteRequest {
    fn default() -> Self {
        Self {
            max_age: default_invite_max_age(),
            max_uses: 0,
        }
    }
}

impl CreateInviteRequest {
    /// Lifetime, `None` when the invite never expires
    pub fn ttl(&self) -> Option<chrono::Duration> {
        (self.max_age > 0).then(|| chrono::Duration::seconds(self.max_age))
    }

    /// Use cap, `None` when unlimited
    pub fn max_uses(&self) -> Option<i32> {
        (self.max_uses > 0).then_some(self.max_uses)
    }
}

fn default_invite_max_age() -> i64 {
    86400 // 24 hours
}
