//! Domain entities and aggregates

mod aggregate;
mod channel;
mod invite;
mod member;
mod message;
mod reaction;

pub use aggregate::AggregateRoot;
pub use channel::{Channel, ChannelParts};
pub use invite::{generate_invite_code, ChannelInvite, InviteParts};
pub use member::{Member, MemberRole};
pub use message::{Message, MessageAuthor};
pub use reaction::Reaction;
