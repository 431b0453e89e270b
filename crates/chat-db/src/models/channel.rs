//! Channel database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for channels table
#[derive(Debug, Clone, FromRow)]
pub struct ChannelModel {
    pub id: i64,
    pub name: String,
    pub topic: String,
    pub creator_id: i64,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub version: i64,
}

/// Database model for channel_members table
#[derive(Debug, Clone, FromRow)]
pub struct ChannelMemberModel {
    pub channel_id: i64,
    pub user_id: i64,
    /// 'owner' or 'member'
    pub role: String,
    pub joined_at: DateTime<Utc>,
    pub last_read: DateTime<Utc>,
}
