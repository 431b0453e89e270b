//! Fan-out bus between hub instances
//!
//! Every envelope published on the bus is delivered once to every
//! subscriber, including the publishing instance itself.

mod caching;
mod local;
mod redis_bus;

pub use caching::CachingBus;
pub use local::LocalBus;
pub use redis_bus::RedisBus;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::pool::RedisPoolError;
use crate::pubsub::BusEnvelope;

/// Envelopes buffered per subscriber before it starts lagging
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Bus errors
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error(transparent)]
    Redis(#[from] RedisPoolError),
}

#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish to the subscribers of `envelope.channel_id`
    async fn publish(&self, envelope: &BusEnvelope) -> Result<(), BusError>;

    /// A new stream of every envelope published from now on
    fn subscribe(&self) -> broadcast::Receiver<BusEnvelope>;

    /// Whether the bus backend is reachable
    async fn health_check(&self) -> Result<(), BusError> {
        Ok(())
    }
}
