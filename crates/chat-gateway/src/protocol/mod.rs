//! Gateway protocol definitions
//!
//! JSON text frames `{type, payload}` in both directions.

mod frame;
mod frame_type;
mod payloads;

pub use frame::Frame;
pub use frame_type::FrameType;
pub use payloads::{
    ConnectedPayload, ErrorPayload, MessagePayload, ReactionPayload, TypingEvent, TypingPayload,
};
