//! Database models - SQLx-compatible structs for PostgreSQL tables

mod channel;
mod invite;
mod message;
mod reaction;

pub use channel::{ChannelMemberModel, ChannelModel};
pub use invite::InviteModel;
pub use message::MessageModel;
pub use reaction::ReactionModel;
