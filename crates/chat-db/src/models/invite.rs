//! Invite database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for channel_invites table
#[derive(Debug, Clone, FromRow)]
pub struct InviteModel {
    pub id: i64,
    pub channel_id: i64,
    pub creator_id: i64,
    pub code: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub uses: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}
