//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for messages table
///
/// Exactly one of `sender_user_id` and `integration_id` is set.
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub channel_id: i64,
    pub sender_user_id: Option<i64>,
    pub integration_id: Option<i64>,
    pub content: String,
    pub mentions: Vec<i64>,
    pub links: Vec<String>,
    pub formatted: bool,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

