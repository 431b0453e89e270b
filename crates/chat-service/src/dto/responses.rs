//! Response DTOs for API endpoints and gateway frames
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chat_core::{MemberRole, Snowflake};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Paginated response with cursor-based pagination
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, before: Option<Snowflake>, has_more: bool, limit: usize) -> Self {
        Self {
            data,
            pagination: PaginationMeta {
                before,
                has_more,
                limit,
            },
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    /// Cursor for fetching the previous (older) page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Snowflake>,
    /// Whether more results exist
    pub has_more: bool,
    /// Page size limit used
    pub limit: usize,
}

// ============================================================================
// User Responses
// ============================================================================

/// Identity data attached to enriched payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: Snowflake,
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrationSummary {
    pub id: Snowflake,
    pub service_name: String,
}

// ============================================================================
// Channel Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChannelResponse {
    pub id: Snowflake,
    pub name: String,
    pub topic: String,
    pub creator_id: Snowflake,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub version: i64,
    pub members: Vec<MemberResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub last_read: DateTime<Utc>,
}

/// Result of archive / unarchive; `changed` is false for a no-op
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveResponse {
    pub archived: bool,
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadMarkerResponse {
    pub channel_id: Snowflake,
    pub last_read: DateTime<Utc>,
}

// ============================================================================
// Message Responses
// ============================================================================

/// Message as delivered to clients
///
/// `sender` and `integration` are filled in by enrichment and omitted when
/// the lookup failed or timed out.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_user_id: Option<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<Snowflake>,
    pub content: String,
    pub mentions: Vec<Snowflake>,
    pub links: Vec<String>,
    pub formatted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub reactions: Vec<ReactionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration: Option<IntegrationSummary>,
}

// ============================================================================
// Reaction Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReactionResponse {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub reaction_type: String,
    pub created_at: DateTime<Utc>,
}

/// Reaction change pushed to subscribers
#[derive(Debug, Clone, Serialize)]
pub struct ReactionEventResponse {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub reaction_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Membership change pushed to subscribers (`user_joined` / `user_left`)
#[derive(Debug, Clone, Serialize)]
pub struct MembershipEventResponse {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

// ============================================================================
// Invite Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub id: Snowflake,
    pub code: String,
    pub channel_id: Snowflake,
    pub creator_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<i32>,
    pub uses: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub bus: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, bus_healthy: bool) -> Self {
        let all_healthy = database_healthy && bus_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                bus: if bus_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
