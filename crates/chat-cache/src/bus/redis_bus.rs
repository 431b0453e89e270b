use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::{BusError, MessageBus, DEFAULT_BUS_CAPACITY};
use crate::pool::RedisPool;
use crate::pubsub::{BusEnvelope, Publisher, Subscriber, SubscriberConfig};

/// Redis-backed bus: PUBLISH to `channel:{id}`, PSUBSCRIBE `channel:*`
pub struct RedisBus {
    pool: RedisPool,
    publisher: Publisher,
    tx: broadcast::Sender<BusEnvelope>,
    listener: JoinHandle<()>,
}

impl RedisBus {
    /// Start the pattern subscriber and return the bus
    pub fn start(pool: RedisPool) -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_BUS_CAPACITY);
        let listener = Subscriber::spawn(SubscriberConfig::new(pool.url()), tx.clone());

        Self {
            publisher: Publisher::new(pool.clone()),
            pool,
            tx,
            listener,
        }
    }
}

impl Drop for RedisBus {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl std::fmt::Debug for RedisBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBus")
            .field("pool", &self.pool)
            .field("subscribers", &self.tx.receiver_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageBus for RedisBus {
    async fn publish(&self, envelope: &BusEnvelope) -> Result<(), BusError> {
        self.publisher.publish(envelope).await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<BusEnvelope> {
        self.tx.subscribe()
    }

    async fn health_check(&self) -> Result<(), BusError> {
        self.pool.health_check().await?;
        Ok(())
    }
}
