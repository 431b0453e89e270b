use std::sync::Arc;

use async_trait::async_trait;
use chat_core::Snowflake;
use serde::Deserialize;
use tokio::sync::broadcast;

use super::{BusError, MessageBus};
use crate::pubsub::{BusEnvelope, EventKind};
use crate::recent::RecentMessages;

/// Bus that also records every published `new_message` in a recent cache
///
/// The cache write happens once, on the publishing side, whichever process
/// (HTTP API or gateway) posted the message. Cache failures are logged and
/// never stop the publish.
pub struct CachingBus {
    inner: Arc<dyn MessageBus>,
    recent: Arc<dyn RecentMessages>,
}

impl CachingBus {
    pub fn new(inner: Arc<dyn MessageBus>, recent: Arc<dyn RecentMessages>) -> Self {
        Self { inner, recent }
    }

    async fn remember(&self, envelope: &BusEnvelope) {
        #[derive(Deserialize)]
        struct Posted {
            id: Snowflake,
        }

        let posted = match Posted::deserialize(&envelope.payload) {
            Ok(posted) => posted,
            Err(e) => {
                tracing::warn!(
                    channel_id = %envelope.channel_id,
                    error = %e,
                    "new_message without a message id, not cached"
                );
                return;
            }
        };

        if let Err(e) = self
            .recent
            .record_message(envelope.channel_id, posted.id, &envelope.payload)
            .await
        {
            tracing::warn!(
                channel_id = %envelope.channel_id,
                message_id = %posted.id,
                error = %e,
                "Failed to cache recent message"
            );
        }
    }
}

impl std::fmt::Debug for CachingBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingBus").finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageBus for CachingBus {
    async fn publish(&self, envelope: &BusEnvelope) -> Result<(), BusError> {
        if envelope.kind() == Some(EventKind::NewMessage) {
            self.remember(envelope).await;
        }
        self.inner.publish(envelope).await
    }

    fn subscribe(&self) -> broadcast::Receiver<BusEnvelope> {
        self.inner.subscribe()
    }

    async fn health_check(&self) -> Result<(), BusError> {
        self.inner.health_check().await
    }
}
