//! WebSocket handler
//!
//! Verifies the token, upgrades, and runs one receive, send and keep-alive
//! task per connection until the peer goes away.

use crate::connection::{new_session_id, Connection};
use crate::handlers::FrameDispatcher;
use crate::protocol::{ErrorPayload, Frame};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chat_core::Snowflake;
use chat_service::ChannelService;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::interval;

/// A peer silent for this many keep-alive intervals is dropped
const IDLE_INTERVALS: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// `GET /ws?token=…` (or `Authorization: Bearer …`)
pub async fn ws_handler(
    State(state): State<GatewayState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(token) = query.token.or_else(|| bearer_token(&headers)) else {
        tracing::debug!("WebSocket upgrade without a token");
        return unauthorized("Missing authentication");
    };

    let verified = match state.verifier().verify(&token) {
        Ok(verified) => verified,
        Err(e) => {
            tracing::debug!(error = %e, "WebSocket upgrade with an invalid token");
            return unauthorized(&e.to_string());
        }
    };

    ws.on_upgrade(move |socket| handle_socket(state, socket, verified.user_id))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn unauthorized(reason: &str) -> Response {
    let body = ErrorPayload {
        message: "Unauthorized".to_string(),
        error: reason.to_string(),
        code: None,
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket, user_id: Snowflake) {
    let session_id = new_session_id();
    let (tx, mut rx) = mpsc::channel::<Frame>(state.hub().outbound_buffer.max(1));

    let connection = open_session(&state, &session_id, user_id, tx).await;

    tracing::info!(
        session_id = %session_id,
        user_id = %user_id,
        channels = connection.channels().len(),
        "WebSocket connection established"
    );

    let (mut ws_sink, mut ws_stream) = socket.split();
    let keepalive = state.hub().keepalive_interval();

    // Receive task: frames are handled one at a time, in arrival order
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            connection_recv.record_activity();
            match msg {
                Ok(Message::Text(text)) => {
                    handle_text(&state_recv, &connection_recv, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    reply_error(
                        &connection_recv,
                        crate::handlers::HandlerError::Malformed(
                            "binary frames are not supported".to_string(),
                        ),
                    )
                    .await;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::info!(
                        session_id = %connection_recv.session_id(),
                        "Client closed connection"
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %connection_recv.session_id(),
                        error = %e,
                        "WebSocket error"
                    );
                    break;
                }
            }
        }
    });

    // Send task: drains the outbound queue and sends protocol pings
    let session_id_send = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        let mut ping = interval(keepalive);
        ping.tick().await;

        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let Some(frame) = frame else { break };
                    let json = match frame.to_json() {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to encode frame");
                            continue;
                        }
                    };
                    if ws_sink.send(Message::Text(json.into())).await.is_err() {
                        tracing::warn!(
                            session_id = %session_id_send,
                            "Failed to send message to WebSocket"
                        );
                        break;
                    }
                }
                _ = ping.tick() => {
                    if ws_sink.send(Message::Ping(Vec::<u8>::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    // Keep-alive task: ends the session once the peer stops answering
    let connection_idle = connection.clone();
    let mut keepalive_task = tokio::spawn(async move {
        let mut check = interval(keepalive);
        let limit = keepalive * IDLE_INTERVALS;

        loop {
            check.tick().await;
            let idle = connection_idle.idle_for();
            if idle > limit {
                tracing::warn!(
                    session_id = %connection_idle.session_id(),
                    idle_ms = idle.as_millis() as u64,
                    "Connection timed out"
                );
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => tracing::debug!(session_id = %session_id, "Receive task ended"),
        _ = &mut send_task => tracing::debug!(session_id = %session_id, "Send task ended"),
        _ = &mut keepalive_task => tracing::debug!(session_id = %session_id, "Keep-alive task ended"),
    }

    recv_task.abort();
    send_task.abort();
    keepalive_task.abort();

    cleanup_connection(&state, &session_id, &connection);
}

/// Register a connection with `connected` already at the head of its queue
///
/// The frame goes in before the connection is visible to fan-out, so no
/// broadcast can overtake it, and the empty queue always has room for it.
async fn open_session(
    state: &GatewayState,
    session_id: &str,
    user_id: Snowflake,
    tx: mpsc::Sender<Frame>,
) -> Arc<Connection> {
    if tx.try_send(Frame::connected(session_id, user_id)).is_err() {
        tracing::warn!(session_id = %session_id, "Could not queue connected frame");
    }

    let connection = state
        .connection_manager()
        .add_connection(session_id.to_string(), user_id, tx);
    subscribe_memberships(state, session_id, user_id).await;
    connection
}

/// Index the connection under every channel the user belongs to
async fn subscribe_memberships(state: &GatewayState, session_id: &str, user_id: Snowflake) {
    let channels = ChannelService::new(state.service_context());
    match channels.channel_ids_for_member(user_id).await {
        Ok(channel_ids) => {
            for channel_id in channel_ids {
                state.connection_manager().subscribe(session_id, channel_id);
            }
        }
        Err(e) => {
            tracing::warn!(
                session_id = %session_id,
                user_id = %user_id,
                error = %e,
                "Failed to load memberships, connection starts unsubscribed"
            );
        }
    }
}

async fn handle_text(state: &GatewayState, connection: &Arc<Connection>, text: &str) {
    if let Err(e) = FrameDispatcher::dispatch_text(state, connection, text).await {
        tracing::debug!(
            session_id = %connection.session_id(),
            error = %e,
            "Frame handling failed"
        );
        reply_error(connection, e).await;
    }
}

async fn reply_error(connection: &Connection, error: crate::handlers::HandlerError) {
    if connection.send(error.to_frame()).await.is_err() {
        tracing::debug!(session_id = %connection.session_id(), "Connection closed before error frame");
    }
}

/// Clean up a connection on disconnect
fn cleanup_connection(state: &GatewayState, session_id: &str, connection: &Arc<Connection>) {
    state.connection_manager().remove_connection(session_id);

    tracing::info!(
        session_id = %session_id,
        user_id = %connection.user_id(),
        duration_secs = connection.age().as_secs(),
        "Connection closed"
    );
}
