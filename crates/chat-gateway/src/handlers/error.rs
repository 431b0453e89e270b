//! Handler error types
//!
//! Every handler failure is answered with an `error` frame on the
//! connection that sent the request; none of them closes the socket.

use crate::protocol::{ErrorPayload, Frame};
use chat_service::ServiceError;
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Frame text is not a `{type, payload}` object
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// Type is unknown or not sendable by clients
    #[error("Unknown frame type: {0}")]
    UnknownType(String),

    /// Payload missing fields or failing validation
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Service error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Outbound payload could not be encoded
    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<validator::ValidationErrors> for HandlerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::InvalidPayload(errors.to_string())
    }
}

impl HandlerError {
    /// Short description for the `message` field
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "Malformed frame",
            Self::UnknownType(_) => "Unknown frame type",
            Self::InvalidPayload(_) => "Invalid payload",
            Self::Service(_) => "Request failed",
            Self::Encode(_) => "Internal error",
        }
    }

    /// The `error` frame answering this failure
    pub fn to_frame(&self) -> Frame {
        let (error, code) = match self {
            Self::Malformed(detail) | Self::UnknownType(detail) | Self::InvalidPayload(detail) => {
                (detail.clone(), None)
            }
            Self::Service(e) => (e.to_string(), Some(e.error_code().to_string())),
            Self::Encode(e) => (e.to_string(), None),
        };

        Frame::error(ErrorPayload {
            message: self.summary().to_string(),
            error,
            code,
        })
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
