//! Reaction handlers

use axum::{extract::State, Json};
use chat_cache::EventKind;
use chat_core::Reaction;
use chat_service::{ChannelService, Enricher, ReactionRequest, ReactionResponse};
use validator::Validate;

use crate::extractors::{ApiPath, AuthUser, ReactionPath};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

impl From<ReactionPath> for ReactionRequest {
    fn from(path: ReactionPath) -> Self {
        Self {
            channel_id: path.channel_id,
            message_id: path.message_id,
            reaction_type: path.reaction_type,
        }
    }
}

/// PUT /channels/{channel_id}/messages/{message_id}/reactions/{reaction_type}
pub async fn add_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ReactionPath>,
) -> ApiResult<Json<ReactionResponse>> {
    let request = ReactionRequest::from(path);
    request.validate()?;

    let reaction = ChannelService::new(state.service_context())
        .add_reaction(
            request.channel_id,
            request.message_id,
            auth.user_id,
            &request.reaction_type,
        )
        .await?;

    push(&state, &request, &reaction, EventKind::ReactionAdded).await;
    Ok(Json(ReactionResponse::from(&reaction)))
}

/// DELETE /channels/{channel_id}/messages/{message_id}/reactions/{reaction_type}
///
/// Removes the caller's own reaction.
pub async fn remove_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<ReactionPath>,
) -> ApiResult<NoContent> {
    let request = ReactionRequest::from(path);
    request.validate()?;

    let reaction = ChannelService::new(state.service_context())
        .remove_reaction(
            request.channel_id,
            request.message_id,
            auth.user_id,
            &request.reaction_type,
        )
        .await?;

    push(&state, &request, &reaction, EventKind::ReactionRemoved).await;
    Ok(NoContent)
}

async fn push(state: &AppState, request: &ReactionRequest, reaction: &Reaction, kind: EventKind) {
    let event = Enricher::new(state.service_context())
        .reaction(request.channel_id, reaction)
        .await;
    state.push(request.channel_id, kind, &event).await;
}
