//! Redis Pub/Sub subscriber.
//!
//! Pattern-subscribes to every channel topic and forwards decoded envelopes
//! into a local broadcast channel. The loop reconnects after a delay when
//! the connection drops.

use std::time::Duration;

use futures_util::StreamExt;
use redis::Client;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::pool::redact;
use crate::pubsub::{parse_channel_topic, BusEnvelope, CHANNEL_PATTERN};

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Pub/Sub stream ended")]
    StreamEnded,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Reconnection delay
    pub reconnect_delay: Duration,
}

impl SubscriberConfig {
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

/// Redis pattern subscriber
pub struct Subscriber;

impl Subscriber {
    /// Start the background listener; envelopes are sent to `tx`
    pub fn spawn(config: SubscriberConfig, tx: broadcast::Sender<BusEnvelope>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                if let Err(e) = Self::run_listener(&config, &tx).await {
                    tracing::error!(error = %e, "Subscriber error, reconnecting...");
                }
                tokio::time::sleep(config.reconnect_delay).await;
            }
        })
    }

    /// Run the listener until error or end of stream
    async fn run_listener(
        config: &SubscriberConfig,
        tx: &broadcast::Sender<BusEnvelope>,
    ) -> SubscriberResult<()> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.psubscribe(CHANNEL_PATTERN).await?;

        tracing::info!(
            url = %redact(&config.redis_url),
            pattern = CHANNEL_PATTERN,
            "Subscriber connected to Redis"
        );

        let mut stream = pubsub.on_message();
        while let Some(msg) = stream.next().await {
            let topic = msg.get_channel_name().to_string();
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(topic = %topic, error = %e, "Unreadable Pub/Sub payload");
                    continue;
                }
            };

            if let Some(envelope) = decode(&topic, &payload) {
                // No receivers is not an error
                let _ = tx.send(envelope);
            }
        }

        Err(SubscriberError::StreamEnded)
    }
}

/// Decode a message, dropping anything that is not a well-formed envelope
/// for the topic it arrived on
fn decode(topic: &str, payload: &str) -> Option<BusEnvelope> {
    let channel_id = parse_channel_topic(topic)?;
    match serde_json::from_str::<BusEnvelope>(payload) {
        Ok(envelope) if envelope.channel_id == channel_id => Some(envelope),
        Ok(envelope) => {
            tracing::warn!(
                topic = %topic,
                channel_id = %envelope.channel_id,
                "Envelope published on the wrong topic"
            );
            None
        }
        Err(e) => {
            tracing::warn!(topic = %topic, error = %e, "Failed to parse envelope");
            None
        }
    }
}
