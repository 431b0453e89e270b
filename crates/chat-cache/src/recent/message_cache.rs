//! Short-lived copies of new messages and a capped recent list per channel.
//!
//! This is an accelerator only: the database stays the source of truth, and
//! callers log and ignore failures.

use async_trait::async_trait;
use chat_common::CacheConfig;
use chat_core::Snowflake;
use redis::AsyncCommands;
use serde_json::Value;

use super::RecentMessages;
use crate::pool::{RedisPool, RedisResult};

/// Key holding one serialized message
#[must_use]
pub fn message_key(message_id: Snowflake) -> String {
    format!("message:{message_id}")
}

/// Key holding the newest message ids of a channel, newest first
#[must_use]
pub fn recent_key(channel_id: Snowflake) -> String {
    format!("channel:{channel_id}:recent")
}

/// Redis-backed recent-message cache
#[derive(Debug, Clone)]
pub struct RecentMessageCache {
    pool: RedisPool,
    config: CacheConfig,
}

impl RecentMessageCache {
    pub fn new(pool: RedisPool, config: CacheConfig) -> Self {
        Self { pool, config }
    }

    /// Store `message` and push its id onto the channel's recent list
    pub async fn record<V: serde::Serialize + Sync>(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        message: &V,
    ) -> RedisResult<()> {
        let serialized = serde_json::to_string(message)?;
        let list = recent_key(channel_id);
        let keep = self.config.recent_list_size.max(1) as isize;

        let mut conn = self.pool.get().await?;
        redis::pipe()
            .atomic()
            .set_ex(message_key(message_id), serialized, self.config.message_ttl_seconds)
            .ignore()
            .lpush(&list, message_id.into_inner())
            .ignore()
            .ltrim(&list, 0, keep - 1)
            .ignore()
            .expire(&list, self.config.recent_list_ttl_seconds as i64)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        Ok(())
    }

    /// Up to `limit` most recent message ids of a channel, newest first
    pub async fn recent_ids(&self, channel_id: Snowflake, limit: usize) -> RedisResult<Vec<Snowflake>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await?;
        let ids: Vec<i64> = conn
            .lrange(recent_key(channel_id), 0, limit as isize - 1)
            .await?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }

    /// A cached message, while its TTL lasts
    pub async fn get<V: serde::de::DeserializeOwned>(
        &self,
        message_id: Snowflake,
    ) -> RedisResult<Option<V>> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = conn.get(message_key(message_id)).await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RecentMessages for RecentMessageCache {
    async fn record_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        message: &Value,
    ) -> RedisResult<()> {
        self.record(channel_id, message_id, message).await
    }

    /// Ids whose message key already expired are skipped
    async fn recent_messages(&self, channel_id: Snowflake, limit: usize) -> RedisResult<Vec<Value>> {
        let mut messages = Vec::new();
        for id in self.recent_ids(channel_id, limit).await? {
            if let Some(message) = self.get::<Value>(id).await? {
                messages.push(message);
            }
        }
        Ok(messages)
    }
}
