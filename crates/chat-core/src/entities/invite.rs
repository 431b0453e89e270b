//! Channel invite aggregate - a shareable code that lets users join a channel

use chrono::{DateTime, Duration, Utc};

use super::AggregateRoot;
use crate::error::DomainError;
use crate::events::{AggregateType, DomainEvent, EventPayload};
use crate::value_objects::{Snowflake, SnowflakeGenerator};

/// Channel invite
///
/// Saved with the same versioned protocol as [`super::Channel`].
#[derive(Debug, Clone)]
pub struct ChannelInvite {
    id: Snowflake,
    channel_id: Snowflake,
    creator_id: Snowflake,
    code: String,
    expires_at: Option<DateTime<Utc>>,
    max_uses: Option<i32>,
    uses: i32,
    active: bool,
    created_at: DateTime<Utc>,
    version: i64,
    events: Vec<DomainEvent>,
}

/// Stored state of an invite
#[derive(Debug, Clone)]
pub struct InviteParts {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub creator_id: Snowflake,
    pub code: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub uses: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl ChannelInvite {
    /// Create an active invite. `max_uses` and `ttl` of `None` mean unlimited.
    pub fn new(
        ids: &SnowflakeGenerator,
        channel_id: Snowflake,
        creator_id: Snowflake,
        max_uses: Option<i32>,
        ttl: Option<Duration>,
    ) -> Result<Self, DomainError> {
        if max_uses.is_some_and(|n| n <= 0) {
            return Err(DomainError::ValidationError(
                "max_uses must be positive".to_string(),
            ));
        }
        if ttl.is_some_and(|d| d <= Duration::zero()) {
            return Err(DomainError::ValidationError(
                "invite lifetime must be positive".to_string(),
            ));
        }

        let created_at = Utc::now();
        let mut invite = Self {
            id: ids.generate(),
            channel_id,
            creator_id,
            code: generate_invite_code(),
            expires_at: ttl.map(|d| created_at + d),
            max_uses,
            uses: 0,
            active: true,
            created_at,
            version: 0,
            events: Vec::new(),
        };
        invite.record(EventPayload::InviteCreated {
            channel_id,
            code: invite.code.clone(),
            created_by: creator_id,
        });
        Ok(invite)
    }

    pub fn from_parts(parts: InviteParts) -> Self {
        Self {
            id: parts.id,
            channel_id: parts.channel_id,
            creator_id: parts.creator_id,
            code: parts.code,
            expires_at: parts.expires_at,
            max_uses: parts.max_uses,
            uses: parts.uses,
            active: parts.active,
            created_at: parts.created_at,
            version: parts.version,
            events: Vec::new(),
        }
    }

    pub fn channel_id(&self) -> Snowflake {
        self.channel_id
    }

    pub fn creator_id(&self) -> Snowflake {
        self.creator_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn max_uses(&self) -> Option<i32> {
        self.max_uses
    }

    pub fn uses(&self) -> i32 {
        self.uses
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.uses >= max)
    }

    /// Remaining uses (`None` if unlimited)
    pub fn remaining_uses(&self) -> Option<i32> {
        self.max_uses.map(|max| (max - self.uses).max(0))
    }

    /// Active, not expired and below the use cap
    pub fn can_be_used(&self) -> bool {
        self.check_usable(Utc::now()).is_ok()
    }

    fn check_usable(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.active {
            Err(DomainError::InviteInactive)
        } else if self.is_expired_at(now) {
            Err(DomainError::InviteExpired)
        } else if self.is_exhausted() {
            Err(DomainError::InviteExhausted)
        } else {
            Ok(())
        }
    }

    /// Count one use by `user_id`; the invite deactivates itself at the cap
    pub fn use_invite(&mut self, user_id: Snowflake) -> Result<(), DomainError> {
        self.check_usable(Utc::now())?;

        self.uses += 1;
        if self.is_exhausted() {
            self.active = false;
        }
        self.record(EventPayload::InviteUsed {
            channel_id: self.channel_id,
            used_by: user_id,
            uses: self.uses,
        });
        Ok(())
    }

    /// Deactivate the invite. Allowed for the invite creator and the channel
    /// creator. Returns `false` if it was already inactive.
    pub fn deactivate(
        &mut self,
        user_id: Snowflake,
        channel_creator_id: Snowflake,
    ) -> Result<bool, DomainError> {
        if user_id != self.creator_id && user_id != channel_creator_id {
            return Err(DomainError::NotInviteManager);
        }
        if !self.active {
            return Ok(false);
        }

        self.active = false;
        self.record(EventPayload::InviteDeactivated {
            channel_id: self.channel_id,
            deactivated_by: user_id,
        });
        Ok(true)
    }

    fn record(&mut self, payload: EventPayload) {
        self.version += 1;
        self.events.push(DomainEvent::new(
            Self::AGGREGATE_TYPE,
            self.id,
            self.version,
            payload,
        ));
    }
}

impl AggregateRoot for ChannelInvite {
    const AGGREGATE_TYPE: AggregateType = AggregateType::ChannelInvite;

    fn id(&self) -> Snowflake {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Generate a random 8-character alphanumeric invite code
pub fn generate_invite_code() -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const CODE_LEN: usize = 8;

    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
