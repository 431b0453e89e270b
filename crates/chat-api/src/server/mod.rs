//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::sync::Arc;

use axum::Router;
use chat_cache::{CachingBus, RecentMessageCache, RedisBus, RedisPool};
use chat_common::{AppConfig, AppError, JwtService};
use chat_core::SnowflakeGenerator;
use chat_db::{create_pool, run_migrations, PgChannelRepository, PgInviteRepository};
use chat_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// Health routes sit outside the middleware stack so health checks are never
/// rate limited.
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    let api = apply_middleware(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );

    api.merge(health_routes()).with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }

    let service_context = ServiceContextBuilder::new()
        .channel_repo(Arc::new(PgChannelRepository::new(pool.clone())))
        .invite_repo(Arc::new(PgInviteRepository::new(pool.clone())))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .collaborators(&config.services)
        .and_then(ServiceContextBuilder::build)
        .map_err(|e| AppError::Config(e.to_string()))?;

    let verifier = Arc::new(JwtService::from_config(&config.jwt));
    let mut state = AppState::new(service_context, verifier).with_database(pool);

    match &config.redis {
        Some(redis) => {
            info!("Connecting to Redis...");
            let redis_pool =
                RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
            let recent = Arc::new(RecentMessageCache::new(redis_pool.clone(), config.cache.clone()));
            let bus = CachingBus::new(Arc::new(RedisBus::start(redis_pool)), recent.clone());
            state = state.with_bus(Arc::new(bus)).with_recent_messages(recent);
        }
        None => warn!("REDIS_URL not set, HTTP events will not reach gateway clients"),
    }

    Ok(state)
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_app_state(&config).await?;
    let app = create_app(state, &config);

    run_server(app, &config.api.address()).await
}
