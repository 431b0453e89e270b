//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in chat-core.
//! Each repository stores one aggregate and enforces the versioned save.

mod channel;
mod error;
mod invite;

pub use channel::PgChannelRepository;
pub use invite::PgInviteRepository;
