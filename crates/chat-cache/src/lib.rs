//! # chat-cache
//!
//! Redis plumbing for the real-time layer.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: channel topics, publisher and pattern subscriber
//! - **Bus**: the `MessageBus` seam with a Redis and an in-process implementation
//! - **Recent messages**: short-TTL message copies and capped per-channel id
//!   lists, written by `CachingBus` on publish
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::{BusEnvelope, MessageBus, RedisBus, RedisPool};
//!
//! let pool = RedisPool::from_config(&redis_config)?;
//! let bus = RedisBus::start(pool);
//! let mut events = bus.subscribe();
//!
//! bus.publish(&BusEnvelope::new(channel_id, "new_message", payload)).await?;
//! let received = events.recv().await?;
//! ```

pub mod bus;
pub mod pool;
pub mod pubsub;
pub mod recent;

pub use bus::{BusError, CachingBus, LocalBus, MessageBus, RedisBus, DEFAULT_BUS_CAPACITY};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use pubsub::{
    channel_topic, parse_channel_topic, BusEnvelope, EventKind, Publisher, Subscriber,
    SubscriberConfig, SubscriberError, CHANNEL_PATTERN, CHANNEL_PREFIX,
};
pub use recent::{MemoryRecentMessages, RecentMessageCache, RecentMessages};
