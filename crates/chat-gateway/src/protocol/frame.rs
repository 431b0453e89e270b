//! Gateway frame format
//!
//! Every frame in either direction is `{"type": string, "payload": object}`.

use chat_cache::BusEnvelope;
use chat_core::Snowflake;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ConnectedPayload, ErrorPayload, FrameType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub frame_type: String,

    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    json!({})
}

impl Frame {
    // === Server Frames ===

    #[must_use]
    pub fn new(frame_type: impl Into<String>, payload: Value) -> Self {
        Self {
            frame_type: frame_type.into(),
            payload,
        }
    }

    /// First frame on every connection
    #[must_use]
    pub fn connected(session_id: &str, user_id: Snowflake) -> Self {
        let payload = ConnectedPayload {
            session_id: session_id.to_string(),
            user_id,
        };
        Self::new(
            FrameType::Connected.as_str(),
            serde_json::to_value(payload).unwrap_or_else(|_| empty_payload()),
        )
    }

    #[must_use]
    pub fn pong() -> Self {
        Self::new(FrameType::Pong.as_str(), empty_payload())
    }

    #[must_use]
    pub fn error(payload: ErrorPayload) -> Self {
        Self::new(
            FrameType::Error.as_str(),
            serde_json::to_value(payload).unwrap_or_else(|_| empty_payload()),
        )
    }

    // === Client Frames ===

    /// The frame type, if it is one the protocol defines
    #[must_use]
    pub fn kind(&self) -> Option<FrameType> {
        FrameType::from_name(&self.frame_type)
    }

    /// Decode the payload into a typed request
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    // === Utilities ===

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A bus envelope becomes the frame its subscribers receive
impl From<&BusEnvelope> for Frame {
    fn from(envelope: &BusEnvelope) -> Self {
        Self::new(envelope.event_type.clone(), envelope.payload.clone())
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame(type={})", self.frame_type)
    }
}
