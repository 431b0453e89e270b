//! Domain events - facts recorded by aggregates when their state changes
//!
//! Every event is wrapped in an envelope carrying the identity and version
//! of the aggregate that produced it. Events are buffered on the aggregate
//! and handed to an `EventPublisher` once the aggregate has been saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::Snowflake;

/// Kind of aggregate an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateType {
    Channel,
    ChannelInvite,
}

impl AggregateType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::ChannelInvite => "channel_invite",
        }
    }
}

impl std::fmt::Display for AggregateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub aggregate_id: Snowflake,
    pub aggregate_type: AggregateType,
    /// Aggregate version right after the change
    pub aggregate_version: i64,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl DomainEvent {
    pub fn new(
        aggregate_type: AggregateType,
        aggregate_id: Snowflake,
        aggregate_version: i64,
        payload: EventPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            aggregate_id,
            aggregate_type,
            aggregate_version,
            payload,
        }
    }

    /// Event name, e.g. `MessageSent`
    #[inline]
    pub fn name(&self) -> &'static str {
        self.payload.name()
    }
}

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data")]
pub enum EventPayload {
    // =========================================================================
    // Channel Events
    // =========================================================================
    ChannelCreated {
        name: String,
        #[serde(default)]
        topic: String,
        creator_id: Snowflake,
    },
    UserJoinedChannel {
        user_id: Snowflake,
    },
    UserLeftChannel {
        user_id: Snowflake,
    },
    ChannelTopicChanged {
        changed_by: Snowflake,
        topic: String,
    },
    ChannelArchived {
        archived_by: Snowflake,
    },
    ChannelUnarchived {
        unarchived_by: Snowflake,
    },

    // =========================================================================
    // Message Events
    // =========================================================================
    MessageSent {
        message_id: Snowflake,
        sender_user_id: Option<Snowflake>,
        integration_id: Option<Snowflake>,
        content: String,
        parent_message_id: Option<Snowflake>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        mentions: Vec<Snowflake>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        links: Vec<String>,
    },

    // =========================================================================
    // Reaction Events
    // =========================================================================
    ReactionAdded {
        message_id: Snowflake,
        reaction_id: Snowflake,
        user_id: Snowflake,
        reaction_type: String,
    },
    ReactionRemoved {
        message_id: Snowflake,
        user_id: Snowflake,
        reaction_type: String,
    },

    // =========================================================================
    // Invite Events
    // =========================================================================
    InviteCreated {
        channel_id: Snowflake,
        code: String,
        created_by: Snowflake,
    },
    InviteUsed {
        channel_id: Snowflake,
        used_by: Snowflake,
        uses: i32,
    },
    InviteDeactivated {
        channel_id: Snowflake,
        deactivated_by: Snowflake,
    },
}

impl EventPayload {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChannelCreated { .. } => "ChannelCreated",
            Self::UserJoinedChannel { .. } => "UserJoinedChannel",
            Self::UserLeftChannel { .. } => "UserLeftChannel",
            Self::ChannelTopicChanged { .. } => "ChannelTopicChanged",
            Self::ChannelArchived { .. } => "ChannelArchived",
            Self::ChannelUnarchived { .. } => "ChannelUnarchived",
            Self::MessageSent { .. } => "MessageSent",
            Self::ReactionAdded { .. } => "ReactionAdded",
            Self::ReactionRemoved { .. } => "ReactionRemoved",
            Self::InviteCreated { .. } => "InviteCreated",
            Self::InviteUsed { .. } => "InviteUsed",
            Self::InviteDeactivated { .. } => "InviteDeactivated",
        }
    }
}
