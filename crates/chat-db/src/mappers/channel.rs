//! Channel aggregate <-> rows mapper

use std::collections::HashMap;

use chat_core::entities::{AggregateRoot, Channel, ChannelParts, Member, MemberRole, Message, Reaction};
use chat_core::value_objects::Snowflake;

use crate::models::{ChannelMemberModel, ChannelModel};

/// Convert ChannelMemberModel to Member entity
impl From<ChannelMemberModel> for Member {
    fn from(model: ChannelMemberModel) -> Self {
        Member {
            user_id: Snowflake::new(model.user_id),
            role: MemberRole::from_str_lossy(&model.role),
            joined_at: model.joined_at,
            last_read: model.last_read,
        }
    }
}

/// Rebuild a channel from its row and already-mapped children
///
/// `messages` must be in stored order; reactions are attached to them by
/// message id.
pub fn channel_from_rows(
    model: ChannelModel,
    members: Vec<ChannelMemberModel>,
    mut messages: Vec<Message>,
    mut reactions: HashMap<Snowflake, Vec<Reaction>>,
) -> Channel {
    for message in &mut messages {
        if let Some(found) = reactions.remove(&message.id) {
            message.reactions = found;
        }
    }

    Channel::from_parts(ChannelParts {
        id: Snowflake::new(model.id),
        name: model.name,
        topic: model.topic,
        creator_id: Snowflake::new(model.creator_id),
        created_at: model.created_at,
        members: members.into_iter().map(Member::from).collect(),
        messages,
        last_message_at: model.last_message_at,
        archived: model.archived,
        version: model.version,
    })
}

/// Channel column values for insert and update
pub struct ChannelRow<'a> {
    pub id: i64,
    pub name: &'a str,
    pub topic: &'a str,
    pub creator_id: i64,
    pub archived: bool,
    pub version: i64,
}

impl<'a> ChannelRow<'a> {
    pub fn new(channel: &'a Channel) -> Self {
        Self {
            id: channel.id().into_inner(),
            name: channel.name(),
            topic: channel.topic(),
            creator_id: channel.creator_id().into_inner(),
            archived: channel.is_archived(),
            version: channel.version(),
        }
    }
}
