//! # chat-common
//!
//! Shared utilities: configuration, error handling, token verification and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Claims, JwtService, StaticTokenVerifier};
pub use config::{
    AppConfig, AppSettings, CacheConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    HubConfig, JwtConfig, RateLimitConfig, RedisConfig, ServerConfig, ServicesConfig,
    SnowflakeConfig,
};
pub use error::{domain_status, AppError, AppResult};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
