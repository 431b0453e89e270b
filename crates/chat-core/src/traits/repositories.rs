//! Repository traits (ports) - define the interface for aggregate storage
//!
//! Aggregates are always loaded and saved whole. `save` is a
//! compare-and-swap on the aggregate version:
//!
//! 1. no stored row: the incoming version must be 1 (insert);
//! 2. stored row: the stored version must equal `incoming.version() - 1`,
//!    and the update must touch exactly one row.
//!
//! Any other outcome is [`DomainError::VersionConflict`] and nothing is
//! written.

use async_trait::async_trait;

use crate::entities::{Channel, ChannelInvite};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Channel Repository
// ============================================================================

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Insert or update a channel with its members, messages and reactions
    async fn save(&self, channel: &Channel) -> RepoResult<()>;

    /// Save a channel and an invite of it as one unit
    ///
    /// Both versions are checked; on any conflict neither aggregate is
    /// written.
    async fn save_with_invite(&self, channel: &Channel, invite: &ChannelInvite) -> RepoResult<()>;

    /// Find channel by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>>;

    /// All channels `user_id` is a member of, oldest first
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>>;

    /// Ids of the channels `user_id` is a member of
    async fn channel_ids_for_member(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Delete a channel and everything it owns
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Invite Repository
// ============================================================================

#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Insert or update an invite
    async fn save(&self, invite: &ChannelInvite) -> RepoResult<()>;

    /// Find invite by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ChannelInvite>>;

    /// Find invite by its code
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<ChannelInvite>>;

    /// All invites of a channel, newest first
    async fn find_by_channel(&self, channel_id: Snowflake) -> RepoResult<Vec<ChannelInvite>>;

    /// Delete an invite
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}
