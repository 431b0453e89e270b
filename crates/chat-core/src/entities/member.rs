//! Member entity - a user's membership in a channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Role of a member inside a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Member,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }

    /// Parse the stored form; unknown values fall back to `Member`
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "owner" => Self::Owner,
            _ => Self::Member,
        }
    }
}

/// Channel member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub last_read: DateTime<Utc>,
}

impl Member {
    /// Create a new Member joined now
    pub fn new(user_id: Snowflake, role: MemberRole) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            role,
            joined_at: now,
            last_read: now,
        }
    }

    #[inline]
    pub fn is_owner(&self) -> bool {
        self.role == MemberRole::Owner
    }

    /// Move the read marker forward; older timestamps are ignored
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if at > self.last_read {
            self.last_read = at;
            true
        } else {
            false
        }
    }
}
