//! Reaction entity - a user's reaction on a message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Reaction entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub reaction_type: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new Reaction
    pub fn new(
        id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        reaction_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            message_id,
            user_id,
            reaction_type: reaction_type.into(),
            created_at: Utc::now(),
        }
    }

    /// Same user and same reaction type
    #[inline]
    pub fn matches(&self, user_id: Snowflake, reaction_type: &str) -> bool {
        self.user_id == user_id && self.reaction_type == reaction_type
    }
}
