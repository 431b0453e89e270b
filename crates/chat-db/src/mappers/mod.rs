//! Entity to model mappers
//!
//! Conversions between domain aggregates (chat-core) and database rows.
//! - `From<Model> for Entity` / `TryFrom`: rows to domain objects
//! - `*Row`/`*Insert` structs: entity data prepared for binding

mod channel;
mod invite;
mod message;

pub use channel::{channel_from_rows, ChannelRow};
pub use message::MessageInsert;
