//! `typing_start` / `typing_stop` handler
//!
//! Typing indicators are ephemeral: checked for membership, enriched and
//! fanned out, never stored.

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::{TypingEvent, TypingPayload};
use crate::server::GatewayState;
use chat_cache::{BusEnvelope, EventKind};
use chat_service::{ChannelService, Enricher};
use std::sync::Arc;

pub struct TypingHandler;

impl TypingHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: TypingPayload,
        started: bool,
    ) -> HandlerResult<()> {
        let ctx = state.service_context();
        let user_id = connection.user_id();
        ChannelService::new(ctx)
            .require_member(payload.channel_id, user_id)
            .await?;

        let event = TypingEvent {
            channel_id: payload.channel_id,
            user_id,
            user: Enricher::new(ctx).user(user_id).await,
        };
        let kind = if started {
            EventKind::TypingStart
        } else {
            EventKind::TypingStop
        };

        state
            .fanout()
            .publish(BusEnvelope::encode(payload.channel_id, kind, &event)?)
            .await;
        Ok(())
    }
}
