//! Application configuration structs
//!
//! Loaded from environment variables (with `.env` support). Every optional
//! value has a default; `DATABASE_URL` and `JWT_SECRET` are required.
//! Leaving `REDIS_URL` unset runs the hub in single-instance mode.

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub gateway: ServerConfig,
    pub hub: HubConfig,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub services: ServicesConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Listen address for the API and the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Real-time hub tuning
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Frames queued per connection before sends start failing
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
    /// Interval between server pings
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_interval_secs: u64,
}

impl HubConfig {
    /// Never zero; tokio intervals reject a zero period
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs.max(1))
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: default_outbound_buffer(),
            keepalive_interval_secs: default_keepalive_secs(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations at startup
    #[serde(default)]
    pub run_migrations: bool,
}

/// Redis configuration (bus and recent-message cache)
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Token verification settings
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

/// Base URLs of the external collaborators
///
/// A missing URL selects the local fallback (in-memory lookup or logging
/// publisher).
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    #[serde(default)]
    pub identity_url: Option<String>,
    #[serde(default)]
    pub integrations_url: Option<String>,
    #[serde(default)]
    pub events_url: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServicesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Recent-message side cache
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_message_ttl")]
    pub message_ttl_seconds: u64,
    #[serde(default = "default_recent_list_size")]
    pub recent_list_size: usize,
    #[serde(default = "default_recent_list_ttl")]
    pub recent_list_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            message_ttl_seconds: default_message_ttl(),
            recent_list_size: default_recent_list_size(),
            recent_list_ttl_seconds: default_recent_list_ttl(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "chat-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_gateway_port() -> u16 {
    8081
}

fn default_outbound_buffer() -> usize {
    100
}

fn default_keepalive_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_leeway() -> u64 {
    30
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_message_ttl() -> u64 {
    300
}

fn default_recent_list_size() -> usize {
    50
}

fn default_recent_list_ttl() -> u64 {
    3600
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does
    /// not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let worker_id: u16 = vars.parsed("WORKER_ID")?.unwrap_or(0);
        if worker_id >= 1024 {
            return Err(ConfigError::InvalidValue(
                "WORKER_ID",
                format!("{worker_id} (must be below 1024)"),
            ));
        }

        let keepalive_interval_secs: u64 = vars
            .parsed("HUB_KEEPALIVE_SECS")?
            .unwrap_or_else(default_keepalive_secs);
        if keepalive_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "HUB_KEEPALIVE_SECS",
                "0 (must be at least 1)".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: match vars.get("APP_ENV") {
                    Some(s) => Environment::parse(&s)
                        .ok_or(ConfigError::InvalidValue("APP_ENV", s))?,
                    None => Environment::default(),
                },
            },
            api: ServerConfig {
                host: vars.get("API_HOST").unwrap_or_else(default_host),
                port: vars.parsed("API_PORT")?.unwrap_or_else(default_api_port),
            },
            gateway: ServerConfig {
                host: vars.get("GATEWAY_HOST").unwrap_or_else(default_host),
                port: vars.parsed("GATEWAY_PORT")?.unwrap_or_else(default_gateway_port),
            },
            hub: HubConfig {
                outbound_buffer: vars
                    .parsed("HUB_OUTBOUND_BUFFER")?
                    .unwrap_or_else(default_outbound_buffer),
                keepalive_interval_secs,
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars
                    .parsed("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: vars
                    .parsed("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
                run_migrations: vars.parsed("DATABASE_RUN_MIGRATIONS")?.unwrap_or(false),
            },
            redis: match vars.get("REDIS_URL") {
                Some(url) => Some(RedisConfig {
                    url,
                    max_connections: vars
                        .parsed("REDIS_MAX_CONNECTIONS")?
                        .unwrap_or_else(default_redis_max_connections),
                }),
                None => None,
            },
            jwt: JwtConfig {
                secret: vars.required("JWT_SECRET")?,
                issuer: vars.get("JWT_ISSUER"),
                leeway_seconds: vars.parsed("JWT_LEEWAY_SECONDS")?.unwrap_or_else(default_leeway),
            },
            services: ServicesConfig {
                identity_url: vars.get("IDENTITY_SERVICE_URL"),
                integrations_url: vars.get("INTEGRATION_SERVICE_URL"),
                events_url: vars.get("EVENTS_SERVICE_URL"),
                request_timeout_ms: vars
                    .parsed("SERVICE_REQUEST_TIMEOUT_MS")?
                    .unwrap_or_else(default_request_timeout_ms),
            },
            cache: CacheConfig {
                message_ttl_seconds: vars
                    .parsed("CACHE_MESSAGE_TTL_SECONDS")?
                    .unwrap_or_else(default_message_ttl),
                recent_list_size: vars
                    .parsed("CACHE_RECENT_LIST_SIZE")?
                    .unwrap_or_else(default_recent_list_size),
                recent_list_ttl_seconds: vars
                    .parsed("CACHE_RECENT_LIST_TTL_SECONDS")?
                    .unwrap_or_else(default_recent_list_ttl),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars
                    .parsed("RATE_LIMIT_REQUESTS_PER_SECOND")?
                    .unwrap_or_else(default_requests_per_second),
                burst: vars.parsed("RATE_LIMIT_BURST")?.unwrap_or_else(default_burst),
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig { worker_id },
        })
    }
}

/// Environment lookup with typed accessors
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-empty value of `key`
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn parsed<T: std::str::FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            None => Ok(None),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
