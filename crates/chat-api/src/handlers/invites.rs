//! Invite handlers
//!
//! Endpoints for channel invite management.

use axum::{extract::State, Json};
use chat_cache::EventKind;
use chat_core::AggregateRoot;
use chat_service::{ChannelResponse, CreateInviteRequest, InviteResponse, InviteService};

use super::channels::push_membership;
use crate::extractors::{ApiPath, AuthUser, ChannelPath, InviteCodePath, OptionalValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /channels/{channel_id}/invites
pub async fn get_channel_invites(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
) -> ApiResult<Json<Vec<InviteResponse>>> {
    let invites = InviteService::new(state.service_context())
        .list_invites(path.channel_id, auth.user_id)
        .await?;
    Ok(Json(invites.iter().map(InviteResponse::from).collect()))
}

/// POST /channels/{channel_id}/invites
///
/// An empty body creates an invite with the defaults (24 h, unlimited uses).
pub async fn create_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<CreateInviteRequest>,
) -> ApiResult<Created<Json<InviteResponse>>> {
    let invite = InviteService::new(state.service_context())
        .create_invite(path.channel_id, auth.user_id, request.unwrap_or_default())
        .await?;
    Ok(Created(Json(InviteResponse::from(&invite))))
}

/// POST /invites/{code}
///
/// Joins the caller to the invite's channel.
pub async fn accept_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<InviteCodePath>,
) -> ApiResult<Json<ChannelResponse>> {
    let channel = InviteService::new(state.service_context())
        .accept_invite(&path.code, auth.user_id)
        .await?;

    push_membership(&state, channel.id(), auth.user_id, EventKind::UserJoined).await;
    Ok(Json(ChannelResponse::from(&channel)))
}

/// DELETE /invites/{code}
pub async fn deactivate_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<InviteCodePath>,
) -> ApiResult<NoContent> {
    InviteService::new(state.service_context())
        .deactivate_invite(&path.code, auth.user_id)
        .await?;
    Ok(NoContent)
}
