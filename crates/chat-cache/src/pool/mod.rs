//! Redis connection pool module.
//!
//! Provides connection pooling for Redis using deadpool-redis.

mod redis_pool;

pub(crate) use redis_pool::redact;
pub use redis_pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
