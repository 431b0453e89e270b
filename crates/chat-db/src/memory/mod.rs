//! In-memory repositories
//!
//! Same versioned-save rule as the PostgreSQL adapters, applied under a
//! lock. Used by service and integration tests and by local runs without a
//! database.

mod channel;
mod invite;

pub use channel::MemoryChannelRepository;
pub use invite::MemoryInviteRepository;

use chat_core::entities::AggregateRoot;
use chat_core::error::DomainError;

/// Check `incoming` against the stored copy, if any
fn check_version<A: AggregateRoot>(stored: Option<&A>, incoming: &A) -> Result<(), DomainError> {
    let expected = match stored {
        Some(current) => current.version() + 1,
        None => 1,
    };

    if incoming.version() == expected {
        Ok(())
    } else {
        Err(DomainError::version_conflict(
            A::AGGREGATE_TYPE.as_str(),
            incoming.id(),
            incoming.version() - 1,
        ))
    }
}
