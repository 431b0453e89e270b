//! Frame handlers
//!
//! Decodes client frames and routes them by `type`.

mod error;
mod message;
mod reaction;
mod typing;

pub use error::{HandlerError, HandlerResult};
pub use message::MessageHandler;
pub use reaction::ReactionHandler;
pub use typing::TypingHandler;

use crate::connection::Connection;
use crate::protocol::{Frame, FrameType};
use crate::server::GatewayState;
use std::sync::Arc;

/// Dispatch incoming client frames to the appropriate handler
pub struct FrameDispatcher;

impl FrameDispatcher {
    /// Handle one text frame; failures come back as `HandlerError` for the
    /// caller to answer with an `error` frame
    pub async fn dispatch_text(
        state: &GatewayState,
        connection: &Arc<Connection>,
        text: &str,
    ) -> HandlerResult<()> {
        let frame = Frame::from_json(text).map_err(|e| HandlerError::Malformed(e.to_string()))?;
        Self::dispatch(state, connection, frame).await
    }

    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        frame: Frame,
    ) -> HandlerResult<()> {
        let Some(kind) = frame.kind() else {
            tracing::debug!(
                session_id = %connection.session_id(),
                frame_type = %frame.frame_type,
                "Received unknown frame type"
            );
            return Err(HandlerError::UnknownType(frame.frame_type));
        };

        tracing::trace!(
            session_id = %connection.session_id(),
            frame_type = %kind,
            "Received frame"
        );

        match kind {
            FrameType::Ping => {
                // Only fails when the connection is already shutting down
                connection.send(Frame::pong()).await.ok();
                Ok(())
            }
            FrameType::Message => MessageHandler::handle(state, connection, decode(&frame)?).await,
            FrameType::AddReaction => {
                ReactionHandler::add(state, connection, decode(&frame)?).await
            }
            FrameType::RemoveReaction => {
                ReactionHandler::remove(state, connection, decode(&frame)?).await
            }
            FrameType::TypingStart => {
                TypingHandler::handle(state, connection, decode(&frame)?, true).await
            }
            FrameType::TypingStop => {
                TypingHandler::handle(state, connection, decode(&frame)?, false).await
            }
            // Server-only types
            FrameType::Connected | FrameType::Pong | FrameType::Error => {
                Err(HandlerError::UnknownType(frame.frame_type))
            }
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(frame: &Frame) -> HandlerResult<T> {
    frame
        .payload_as()
        .map_err(|e| HandlerError::InvalidPayload(e.to_string()))
}
