//! Recent-message read side
//!
//! Written by [`CachingBus`](crate::CachingBus) for every `new_message` it
//! publishes, read by the recent-history endpoint. Never the source of
//! truth.

mod memory;
mod message_cache;

pub use memory::MemoryRecentMessages;
pub use message_cache::{message_key, recent_key, RecentMessageCache};

use async_trait::async_trait;
use chat_core::Snowflake;
use serde_json::Value;

use crate::pool::RedisResult;

/// Store of the newest messages of each channel
#[async_trait]
pub trait RecentMessages: Send + Sync {
    /// Remember `message` as the newest of its channel
    async fn record_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        message: &Value,
    ) -> RedisResult<()>;

    /// Up to `limit` still-cached messages, newest first
    async fn recent_messages(&self, channel_id: Snowflake, limit: usize) -> RedisResult<Vec<Value>>;
}
