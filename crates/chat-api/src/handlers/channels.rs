//! Channel handlers
//!
//! Lifecycle, membership, topic, archive state and read markers.

use axum::{extract::State, Json};
use chat_cache::EventKind;
use chat_core::{AggregateRoot, Channel, Snowflake};
use chat_service::{
    ArchiveResponse, ChannelResponse, ChannelService, CreateChannelRequest, Enricher,
    MarkReadRequest, ReadMarkerResponse, UpdateTopicRequest,
};

use crate::extractors::{ApiPath, AuthUser, ChannelPath, OptionalValidatedJson, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// POST /channels
pub async fn create_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateChannelRequest>,
) -> ApiResult<Created<Json<ChannelResponse>>> {
    let channel = ChannelService::new(state.service_context())
        .create_channel(auth.user_id, request)
        .await?;
    Ok(Created(Json(ChannelResponse::from(&channel))))
}

/// GET /channels/{channel_id}
pub async fn get_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
) -> ApiResult<Json<ChannelResponse>> {
    let channel = ChannelService::new(state.service_context())
        .get_channel(path.channel_id, auth.user_id)
        .await?;
    Ok(Json(ChannelResponse::from(&channel)))
}

/// GET /users/@me/channels
pub async fn list_my_channels(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ChannelResponse>>> {
    let channels = ChannelService::new(state.service_context())
        .list_channels(auth.user_id)
        .await?;
    Ok(Json(channels.iter().map(ChannelResponse::from).collect()))
}

/// POST /channels/{channel_id}/members
///
/// Joins the caller to the channel.
pub async fn join_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
) -> ApiResult<Json<ChannelResponse>> {
    let channel = ChannelService::new(state.service_context())
        .join_channel(path.channel_id, auth.user_id)
        .await?;

    push_membership(&state, path.channel_id, auth.user_id, EventKind::UserJoined).await;
    Ok(Json(ChannelResponse::from(&channel)))
}

/// DELETE /channels/{channel_id}/members/@me
pub async fn leave_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
) -> ApiResult<NoContent> {
    ChannelService::new(state.service_context())
        .leave_channel(path.channel_id, auth.user_id)
        .await?;

    push_membership(&state, path.channel_id, auth.user_id, EventKind::UserLeft).await;
    Ok(NoContent)
}

/// PATCH /channels/{channel_id}/topic
pub async fn set_topic(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
    ValidatedJson(request): ValidatedJson<UpdateTopicRequest>,
) -> ApiResult<Json<ChannelResponse>> {
    let channel = ChannelService::new(state.service_context())
        .set_topic(path.channel_id, auth.user_id, &request.topic)
        .await?;

    push_channel_updated(&state, &channel).await;
    Ok(Json(ChannelResponse::from(&channel)))
}

/// POST /channels/{channel_id}/archive
pub async fn archive_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
) -> ApiResult<Json<ArchiveResponse>> {
    let service = ChannelService::new(state.service_context());
    let changed = service.archive_channel(path.channel_id, auth.user_id).await?;
    if changed {
        let channel = service.get_channel(path.channel_id, auth.user_id).await?;
        push_channel_updated(&state, &channel).await;
    }

    Ok(Json(ArchiveResponse {
        archived: true,
        changed,
    }))
}

/// DELETE /channels/{channel_id}/archive
pub async fn unarchive_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
) -> ApiResult<Json<ArchiveResponse>> {
    let service = ChannelService::new(state.service_context());
    let changed = service.unarchive_channel(path.channel_id, auth.user_id).await?;
    if changed {
        let channel = service.get_channel(path.channel_id, auth.user_id).await?;
        push_channel_updated(&state, &channel).await;
    }

    Ok(Json(ArchiveResponse {
        archived: false,
        changed,
    }))
}

/// POST /channels/{channel_id}/read
///
/// Body is optional; without `at` the marker moves to now.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<MarkReadRequest>,
) -> ApiResult<Json<ReadMarkerResponse>> {
    let at = request.and_then(|r| r.at);
    let last_read = ChannelService::new(state.service_context())
        .mark_read(path.channel_id, auth.user_id, at)
        .await?;

    Ok(Json(ReadMarkerResponse {
        channel_id: path.channel_id,
        last_read,
    }))
}

pub(crate) async fn push_membership(
    state: &AppState,
    channel_id: Snowflake,
    user_id: Snowflake,
    kind: EventKind,
) {
    let event = Enricher::new(state.service_context())
        .membership(channel_id, user_id)
        .await;
    state.push(channel_id, kind, &event).await;
}

async fn push_channel_updated(state: &AppState, channel: &Channel) {
    state
        .push(channel.id(), EventKind::ChannelUpdated, &ChannelResponse::from(channel))
        .await;
}
