use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chat_common::CacheConfig;
use chat_core::Snowflake;
use parking_lot::Mutex;
use serde_json::Value;

use super::RecentMessages;
use crate::pool::RedisResult;

/// In-process recent lists with the same cap as the Redis cache
///
/// Entries do not expire.
#[derive(Debug)]
pub struct MemoryRecentMessages {
    capacity: usize,
    channels: Mutex<HashMap<Snowflake, VecDeque<Value>>>,
}

impl MemoryRecentMessages {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            capacity: config.recent_list_size.max(1),
            channels: Mutex::default(),
        }
    }
}

impl Default for MemoryRecentMessages {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[async_trait]
impl RecentMessages for MemoryRecentMessages {
    async fn record_message(
        &self,
        channel_id: Snowflake,
        _message_id: Snowflake,
        message: &Value,
    ) -> RedisResult<()> {
        let mut channels = self.channels.lock();
        let list = channels.entry(channel_id).or_default();
        list.push_front(message.clone());
        list.truncate(self.capacity);
        Ok(())
    }

    async fn recent_messages(&self, channel_id: Snowflake, limit: usize) -> RedisResult<Vec<Value>> {
        Ok(self
            .channels
            .lock()
            .get(&channel_id)
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
