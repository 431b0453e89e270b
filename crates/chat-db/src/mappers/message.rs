//! Message and Reaction entity <-> model mapper

use chat_core::entities::{Message, MessageAuthor, Reaction};
use chat_core::error::DomainError;
use chat_core::value_objects::{MessageContent, Snowflake};

use crate::models::{MessageModel, ReactionModel};

/// Convert MessageModel to Message entity
///
/// Fails when the row does not name exactly one author.
impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let author = match (model.sender_user_id, model.integration_id) {
            (Some(user), None) => MessageAuthor::User(Snowflake::new(user)),
            (None, Some(integration)) => MessageAuthor::Integration(Snowflake::new(integration)),
            _ => {
                return Err(DomainError::DatabaseError(format!(
                    "message {} has no single author",
                    model.id
                )))
            }
        };

        Ok(Message {
            id: Snowflake::new(model.id),
            channel_id: Snowflake::new(model.channel_id),
            author,
            content: MessageContent::from_parts(
                model.content,
                model.mentions.into_iter().map(Snowflake::new).collect(),
                model.links,
                model.formatted,
            ),
            created_at: model.created_at,
            parent_id: model.parent_id.map(Snowflake::new),
            reactions: Vec::new(),
        })
    }
}

/// Convert ReactionModel to Reaction entity
impl From<ReactionModel> for Reaction {
    fn from(model: ReactionModel) -> Self {
        Reaction {
            id: Snowflake::new(model.id),
            message_id: Snowflake::new(model.message_id),
            user_id: Snowflake::new(model.user_id),
            reaction_type: model.reaction_type,
            created_at: model.created_at,
        }
    }
}

/// Message column values for insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub channel_id: i64,
    pub sender_user_id: Option<i64>,
    pub integration_id: Option<i64>,
    pub content: &'a str,
    pub mentions: Vec<i64>,
    pub links: &'a [String],
    pub formatted: bool,
    pub parent_id: Option<i64>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        let (sender_user_id, integration_id) = match message.author {
            MessageAuthor::User(id) => (Some(id.into_inner()), None),
            MessageAuthor::Integration(id) => (None, Some(id.into_inner())),
        };

        Self {
            id: message.id.into_inner(),
            channel_id: message.channel_id.into_inner(),
            sender_user_id,
            integration_id,
            content: message.content.text(),
            mentions: message.content.mentions().iter().map(|m| m.into_inner()).collect(),
            links: message.content.links(),
            formatted: message.content.is_formatted(),
            parent_id: message.parent_id.map(Snowflake::into_inner),
        }
    }
}
