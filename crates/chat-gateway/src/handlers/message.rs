//! `message` handler

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::MessagePayload;
use crate::server::GatewayState;
use chat_cache::{BusEnvelope, EventKind};
use chat_service::{ChannelService, Enricher};
use std::sync::Arc;
use validator::Validate;

/// Posts messages sent over the socket
pub struct MessageHandler;

impl MessageHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: MessagePayload,
    ) -> HandlerResult<()> {
        payload.validate()?;

        let ctx = state.service_context();
        let channel_id = payload.channel_id;
        let message = ChannelService::new(ctx)
            .post_message(
                channel_id,
                connection.user_id(),
                &payload.content,
                payload.parent_message_id,
            )
            .await?;

        // Covers channels joined after this connection was opened
        state
            .connection_manager()
            .subscribe(connection.session_id(), channel_id);

        let response = Enricher::new(ctx).message(&message).await;

        state
            .fanout()
            .publish(BusEnvelope::encode(channel_id, EventKind::NewMessage, &response)?)
            .await;

        tracing::debug!(
            session_id = %connection.session_id(),
            channel_id = %channel_id,
            message_id = %message.id,
            "Message posted"
        );
        Ok(())
    }
}
