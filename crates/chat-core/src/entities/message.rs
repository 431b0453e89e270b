//! Message entity - a message owned by a channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Reaction;
use crate::value_objects::{MessageContent, Snowflake};

/// Who wrote a message
///
/// A message has exactly one author: a human member or an integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MessageAuthor {
    User(Snowflake),
    Integration(Snowflake),
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author: MessageAuthor,
    pub content: MessageContent,
    pub created_at: DateTime<Utc>,
    pub parent_id: Option<Snowflake>,
    pub reactions: Vec<Reaction>,
}

impl Message {
    /// Create a new Message with no reactions
    pub fn new(
        id: Snowflake,
        channel_id: Snowflake,
        author: MessageAuthor,
        content: MessageContent,
        parent_id: Option<Snowflake>,
    ) -> Self {
        Self {
            id,
            channel_id,
            author,
            content,
            created_at: Utc::now(),
            parent_id,
            reactions: Vec::new(),
        }
    }

    /// Sender user id for human-authored messages
    #[inline]
    pub fn sender_id(&self) -> Option<Snowflake> {
        match self.author {
            MessageAuthor::User(id) => Some(id),
            MessageAuthor::Integration(_) => None,
        }
    }

    /// Integration id for integration-authored messages
    #[inline]
    pub fn integration_id(&self) -> Option<Snowflake> {
        match self.author {
            MessageAuthor::Integration(id) => Some(id),
            MessageAuthor::User(_) => None,
        }
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Index of the reaction left by `user_id` with `reaction_type`
    pub fn find_reaction(&self, user_id: Snowflake, reaction_type: &str) -> Option<usize> {
        self.reactions
            .iter()
            .position(|r| r.matches(user_id, reaction_type))
    }

    /// Number of reactions of one type
    pub fn reaction_count(&self, reaction_type: &str) -> usize {
        self.reactions
            .iter()
            .filter(|r| r.reaction_type == reaction_type)
            .count()
    }
}
