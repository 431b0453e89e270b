//! Message handlers
//!
//! History, user posts and integration notifications. New messages are
//! pushed to the channel's live subscribers as `new_message`.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use chat_cache::EventKind;
use chat_core::Message;
use chat_service::{
    ChannelService, CreateMessageRequest, CreateNotificationRequest, Enricher, MessageResponse,
    PaginatedResponse,
};

use crate::extractors::{ApiPath, AuthUser, ChannelPath, Pagination, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /channels/{channel_id}/messages?before={id}&limit={n}
///
/// Oldest first; `pagination.before` is the cursor for the next older page.
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
    pagination: Pagination,
) -> ApiResult<Json<PaginatedResponse<MessageResponse>>> {
    let ctx = state.service_context();
    let (messages, has_more) = ChannelService::new(ctx)
        .messages(path.channel_id, auth.user_id, pagination.before, pagination.limit)
        .await?;

    let cursor = if has_more {
        messages.first().map(|m| m.id)
    } else {
        None
    };
    let data = Enricher::new(ctx).messages(&messages).await;

    Ok(Json(PaginatedResponse::new(data, cursor, has_more, pagination.limit)))
}

/// GET /channels/{channel_id}/messages/recent?limit={n}
///
/// The newest `limit` messages, oldest first. Served from the recent cache
/// when it holds a full page, from the database otherwise.
pub async fn get_recent_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
    pagination: Pagination,
) -> ApiResult<Response> {
    let ctx = state.service_context();
    let channels = ChannelService::new(ctx);
    channels.require_member(path.channel_id, auth.user_id).await?;

    if let Some(recent) = state.recent_messages() {
        match recent.recent_messages(path.channel_id, pagination.limit).await {
            Ok(mut cached) if cached.len() == pagination.limit => {
                cached.reverse();
                return Ok(Json(cached).into_response());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(channel_id = %path.channel_id, error = %e, "Recent cache read failed");
            }
        }
    }

    let (messages, _) = channels
        .messages(path.channel_id, auth.user_id, None, pagination.limit)
        .await?;
    let data = Enricher::new(ctx).messages(&messages).await;
    Ok(Json(data).into_response())
}

/// POST /channels/{channel_id}/messages
pub async fn create_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
    ValidatedJson(request): ValidatedJson<CreateMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let message = ChannelService::new(state.service_context())
        .post_message(
            path.channel_id,
            auth.user_id,
            &request.content,
            request.parent_message_id,
        )
        .await?;

    Ok(Created(Json(announce(&state, &message).await)))
}

/// POST /channels/{channel_id}/notifications
///
/// Posts on behalf of the integration named in the body.
///
/// Trust boundary: the bearer token only proves a caller, not that the
/// caller speaks for the integration. Any authenticated caller, member or
/// not, may post as any registered, unrevoked integration. Deployments must
/// keep this route reachable only from the integration relay.
pub async fn create_notification(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<ChannelPath>,
    ValidatedJson(request): ValidatedJson<CreateNotificationRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let message = ChannelService::new(state.service_context())
        .post_notification(path.channel_id, request.integration_id, &request.content)
        .await?;

    Ok(Created(Json(announce(&state, &message).await)))
}

async fn announce(state: &AppState, message: &Message) -> MessageResponse {
    let response = Enricher::new(state.service_context()).message(message).await;
    state
        .push(message.channel_id, EventKind::NewMessage, &response)
        .await;
    response
}
