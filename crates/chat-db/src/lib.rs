//! # chat-db
//!
//! Storage for the channel and invite aggregates.
//!
//! ## Overview
//!
//! - PostgreSQL repositories via SQLx with a versioned (compare-and-swap) save
//! - Database models with SQLx `FromRow` derives and aggregate mappers
//! - In-memory repositories applying the same version rule, for tests
//! - SQL migrations under `migrations/`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_db::{create_pool, run_migrations, PgChannelRepository};
//!
//! async fn example(config: &chat_common::DatabaseConfig) -> anyhow::Result<()> {
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool).await?;
//!     let channels = PgChannelRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemoryChannelRepository, MemoryInviteRepository};
pub use pool::{create_pool, run_migrations, PgPool};
pub use repositories::{PgChannelRepository, PgInviteRepository};
