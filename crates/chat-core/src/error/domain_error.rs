//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
///
/// Variants are grouped by how a caller should react: validation and
/// authorization failures are terminal, not-found maps to a 404, conflicts
/// are split into duplicates (terminal) and version conflicts (retry after
/// reloading the aggregate).
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Parent message not found: {0}")]
    ParentMessageNotFound(Snowflake),

    #[error("Reaction {reaction_type} by user {user_id} not found on message {message_id}")]
    ReactionNotFound {
        message_id: Snowflake,
        user_id: Snowflake,
        reaction_type: String,
    },

    #[error("User {0} is not a member of this channel")]
    MemberNotFound(Snowflake),

    #[error("Invite not found: {0}")]
    InviteNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Integration not found: {0}")]
    IntegrationNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Channel name must not be empty")]
    EmptyChannelName,

    #[error("Message content must not be empty")]
    EmptyContent,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Authentication / Authorization Errors
    // =========================================================================
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("User {0} is not a member of this channel")]
    NotChannelMember(Snowflake),

    #[error("Only the channel creator can do this")]
    NotChannelCreator,

    #[error("Only the invite creator or channel creator can do this")]
    NotInviteManager,

    #[error("Integration {0} has been revoked")]
    IntegrationRevoked(Snowflake),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already a member of this channel")]
    AlreadyMember,

    #[error("Reaction already exists")]
    ReactionAlreadyExists,

    #[error("Invite code already exists")]
    InviteCodeExists,

    #[error("{aggregate} {id} was modified concurrently (expected stored version {expected})")]
    VersionConflict {
        aggregate: &'static str,
        id: Snowflake,
        expected: i64,
    },

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("The channel creator cannot leave the channel")]
    CannotLeaveOwnedChannel,

    #[error("Invite is no longer active")]
    InviteInactive,

    #[error("Invite has expired")]
    InviteExpired,

    #[error("Invite has reached maximum uses")]
    InviteExhausted,

    // =========================================================================
    // External / Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("External service {service} failed: {message}")]
    ExternalService {
        service: &'static str,
        message: String,
    },

    #[error("External service {0} timed out")]
    ExternalTimeout(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Shorthand for a version conflict on `aggregate`
    pub fn version_conflict(aggregate: &'static str, id: Snowflake, expected: i64) -> Self {
        Self::VersionConflict {
            aggregate,
            id,
            expected,
        }
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::ParentMessageNotFound(_) => "UNKNOWN_PARENT_MESSAGE",
            Self::ReactionNotFound { .. } => "UNKNOWN_REACTION",
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::InviteNotFound(_) => "UNKNOWN_INVITE",
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::IntegrationNotFound(_) => "UNKNOWN_INTEGRATION",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::EmptyChannelName => "EMPTY_CHANNEL_NAME",
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            // Authentication / Authorization
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::NotChannelMember(_) => "NOT_CHANNEL_MEMBER",
            Self::NotChannelCreator => "NOT_CHANNEL_CREATOR",
            Self::NotInviteManager => "NOT_INVITE_MANAGER",
            Self::IntegrationRevoked(_) => "INTEGRATION_REVOKED",

            // Conflict
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::ReactionAlreadyExists => "REACTION_ALREADY_EXISTS",
            Self::InviteCodeExists => "INVITE_CODE_EXISTS",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",

            // Business Rules
            Self::CannotLeaveOwnedChannel => "CANNOT_LEAVE_OWNED_CHANNEL",
            Self::InviteInactive => "INVITE_INACTIVE",
            Self::InviteExpired => "INVITE_EXPIRED",
            Self::InviteExhausted => "INVITE_EXHAUSTED",

            // External / Infrastructure
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::ExternalTimeout(_) => "EXTERNAL_SERVICE_TIMEOUT",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ChannelNotFound(_)
                | Self::MessageNotFound(_)
                | Self::ParentMessageNotFound(_)
                | Self::ReactionNotFound { .. }
                | Self::MemberNotFound(_)
                | Self::InviteNotFound(_)
                | Self::UserNotFound(_)
                | Self::IntegrationNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::EmptyChannelName
                | Self::EmptyContent
                | Self::ContentTooLong { .. }
        )
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotChannelMember(_)
                | Self::NotChannelCreator
                | Self::NotInviteManager
                | Self::IntegrationRevoked(_)
                | Self::CannotLeaveOwnedChannel
        )
    }

    /// Check if this is a conflict error (duplicates and version conflicts)
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyMember
                | Self::ReactionAlreadyExists
                | Self::InviteCodeExists
                | Self::VersionConflict { .. }
                | Self::InviteInactive
                | Self::InviteExpired
                | Self::InviteExhausted
        )
    }

    /// Errors raised by an external collaborator
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalService { .. } | Self::ExternalTimeout(_))
    }

    /// Only a version conflict may be retried by reloading and reapplying
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
