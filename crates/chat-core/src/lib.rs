//! # chat-core
//!
//! Domain layer: the channel and invite aggregates, their value objects and
//! domain events, and the ports (repositories and external collaborators)
//! the outer crates implement. No database, cache or web dependencies.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    generate_invite_code, AggregateRoot, Channel, ChannelInvite, ChannelParts, InviteParts,
    Member, MemberRole, Message, MessageAuthor, Reaction,
};
pub use error::DomainError;
pub use events::{AggregateType, DomainEvent, EventPayload};
pub use traits::{
    ChannelRepository, EventPublisher, IdentityService, Integration, IntegrationLookup,
    InviteRepository, RepoResult, TokenVerifier, UserProfile, VerifiedToken,
};
pub use value_objects::{MessageContent, Snowflake, SnowflakeGenerator, SnowflakeParseError};
