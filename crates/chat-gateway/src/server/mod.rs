//! Gateway server setup
//!
//! Provides the main WebSocket server configuration and routes.

mod handler;
mod health;
mod state;

pub use handler::{ws_handler, WsQuery};
pub use health::{health_check, readiness_check};
pub use state::GatewayState;

use crate::broadcast::{BusBridge, Fanout};
use crate::connection::ConnectionManager;
use axum::{routing::get, Router};
use chat_cache::{CachingBus, MessageBus, RecentMessageCache, RedisBus, RedisPool};
use chat_common::{AppConfig, AppError, JwtService};
use chat_core::SnowflakeGenerator;
use chat_db::{PgChannelRepository, PgInviteRepository};
use chat_service::ServiceContextBuilder;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
///
/// Also starts the bus bridge when Redis is configured.
pub async fn create_gateway_state(config: &AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL...");
    let pool = chat_db::create_pool(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    if config.database.run_migrations {
        chat_db::run_migrations(&pool)
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

    let bus = match &config.redis {
        Some(redis) => {
            tracing::info!("Connecting to Redis...");
            let redis_pool =
                RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
            let recent = Arc::new(RecentMessageCache::new(redis_pool.clone(), config.cache.clone()));
            let bus: Arc<dyn MessageBus> = Arc::new(CachingBus::new(
                Arc::new(RedisBus::start(redis_pool)),
                recent,
            ));
            Some(bus)
        }
        None => {
            tracing::warn!("REDIS_URL not set, running as a single instance");
            None
        }
    };

    let fanout = Arc::new(Fanout::new(ConnectionManager::new_shared(), bus));
    BusBridge::new(fanout.clone()).start();

    let verifier = Arc::new(JwtService::from_config(&config.jwt));

    Ok(GatewayState::new(service_context, fanout, verifier, config.hub.clone()).with_database(pool))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/ws", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_gateway_state(&config).await?;
    let app = create_app(state);

    run_server(app, &config.gateway.address()).await
}
