//! Redis Pub/Sub publisher.
//!
//! Publishes outbound events to channel topics for every hub instance.

use chat_core::Snowflake;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::{channel_topic, EventKind};

/// One outbound event addressed to the subscribers of a channel
///
/// `event_type` and `payload` become the client frame `{type, payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEnvelope {
    pub channel_id: Snowflake,
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: serde_json::Value,
}

impl BusEnvelope {
    #[must_use]
    pub fn new(
        channel_id: Snowflake,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            channel_id,
            event_type: event_type.into(),
            payload,
        }
    }

    /// Envelope for a typed event with a serializable payload
    pub fn encode<T: Serialize>(
        channel_id: Snowflake,
        kind: EventKind,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(channel_id, kind.as_str(), serde_json::to_value(payload)?))
    }

    /// The event kind, if the name is a known one
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_name(&self.event_type)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Redis Pub/Sub publisher
#[derive(Debug, Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an envelope to its channel topic; returns the receiver count
    pub async fn publish(&self, envelope: &BusEnvelope) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let topic = channel_topic(envelope.channel_id);
        let payload = envelope.to_json()?;

        let receivers: u32 = conn.publish(&topic, &payload).await?;

        tracing::debug!(
            topic = %topic,
            event_type = %envelope.event_type,
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }
}
