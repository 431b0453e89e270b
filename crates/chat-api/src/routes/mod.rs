//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{channels, health, invites, messages, reactions};
use crate::state::AppState;

/// Create the main API router (health routes are added separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(channel_routes())
        .merge(invite_routes())
}

/// User routes
fn user_routes() -> Router<AppState> {
    Router::new().route("/users/@me/channels", get(channels::list_my_channels))
}

/// Channel routes
fn channel_routes() -> Router<AppState> {
    Router::new()
        .route("/channels", post(channels::create_channel))
        .route("/channels/:channel_id", get(channels::get_channel))
        // Membership
        .route("/channels/:channel_id/members", post(channels::join_channel))
        .route("/channels/:channel_id/members/@me", delete(channels::leave_channel))
        // Channel state
        .route("/channels/:channel_id/topic", patch(channels::set_topic))
        .route(
            "/channels/:channel_id/archive",
            post(channels::archive_channel).delete(channels::unarchive_channel),
        )
        .route("/channels/:channel_id/read", post(channels::mark_read))
        // Messages
        .route(
            "/channels/:channel_id/messages",
            get(messages::get_messages).post(messages::create_message),
        )
        .route(
            "/channels/:channel_id/messages/recent",
            get(messages::get_recent_messages),
        )
        // Caller is trusted to speak for the integration; see the handler
        .route(
            "/channels/:channel_id/notifications",
            post(messages::create_notification),
        )
        // Reactions
        .route(
            "/channels/:channel_id/messages/:message_id/reactions/:reaction_type",
            put(reactions::add_reaction).delete(reactions::remove_reaction),
        )
        // Invites
        .route(
            "/channels/:channel_id/invites",
            get(invites::get_channel_invites).post(invites::create_invite),
        )
}

/// Invite routes
fn invite_routes() -> Router<AppState> {
    Router::new().route(
        "/invites/:code",
        post(invites::accept_invite).delete(invites::deactivate_invite),
    )
}
