//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub id: i64,
    pub channel_id: i64,
    pub message_id: i64,
    pub user_id: i64,
    pub reaction_type: String,
    pub created_at: DateTime<Utc>,
}
