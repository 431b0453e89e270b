//! `add_reaction` / `remove_reaction` handler

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::ReactionPayload;
use crate::server::GatewayState;
use chat_cache::{BusEnvelope, EventKind};
use chat_service::{ChannelService, Enricher};
use std::sync::Arc;
use validator::Validate;

pub struct ReactionHandler;

impl ReactionHandler {
    pub async fn add(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ReactionPayload,
    ) -> HandlerResult<()> {
        payload.validate()?;

        let reaction = ChannelService::new(state.service_context())
            .add_reaction(
                payload.channel_id,
                payload.message_id,
                connection.user_id(),
                &payload.reaction_type,
            )
            .await?;

        Self::publish(state, EventKind::ReactionAdded, &payload, &reaction).await
    }

    pub async fn remove(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ReactionPayload,
    ) -> HandlerResult<()> {
        payload.validate()?;

        let reaction = ChannelService::new(state.service_context())
            .remove_reaction(
                payload.channel_id,
                payload.message_id,
                connection.user_id(),
                &payload.reaction_type,
            )
            .await?;

        Self::publish(state, EventKind::ReactionRemoved, &payload, &reaction).await
    }

    async fn publish(
        state: &GatewayState,
        kind: EventKind,
        payload: &ReactionPayload,
        reaction: &chat_core::Reaction,
    ) -> HandlerResult<()> {
        let event = Enricher::new(state.service_context())
            .reaction(payload.channel_id, reaction)
            .await;

        state
            .fanout()
            .publish(BusEnvelope::encode(payload.channel_id, kind, &event)?)
            .await;
        Ok(())
    }
}
