//! Health check handlers

use crate::server::GatewayState;
use axum::{extract::State, http::StatusCode, Json};
use chat_service::{HealthResponse, ReadinessResponse};

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /health/ready
///
/// Without a pool (in-memory storage) the database counts as healthy, and
/// likewise the bus in single-instance mode.
pub async fn readiness_check(
    State(state): State<GatewayState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let db_healthy = match state.database() {
        Some(pool) => pool.acquire().await.is_ok(),
        None => true,
    };

    let bus_healthy = match state.fanout().bus() {
        Some(bus) => bus.health_check().await.is_ok(),
        None => true,
    };

    let response = ReadinessResponse::ready(db_healthy, bus_healthy);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
