use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{BusError, MessageBus, DEFAULT_BUS_CAPACITY};
use crate::pubsub::BusEnvelope;

/// In-process bus
///
/// Clones share one channel, so several hubs in the same process (tests,
/// single-node deployments) see each other's envelopes.
#[derive(Debug, Clone)]
pub struct LocalBus {
    tx: broadcast::Sender<BusEnvelope>,
}

impl LocalBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

#[async_trait]
impl MessageBus for LocalBus {
    async fn publish(&self, envelope: &BusEnvelope) -> Result<(), BusError> {
        let receivers = self.tx.send(envelope.clone()).unwrap_or(0);
        tracing::trace!(
            channel_id = %envelope.channel_id,
            event_type = %envelope.event_type,
            receivers,
            "Published locally"
        );
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<BusEnvelope> {
        self.tx.subscribe()
    }
}
