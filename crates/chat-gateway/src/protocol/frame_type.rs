//! Frame types
//!
//! Every frame carries a `type` discriminator. Client types are handled by
//! the dispatcher; `connected`, `pong` and `error` are answered on the
//! requesting connection only. Channel events fanned out to subscribers are
//! named by [`chat_cache::EventKind`].

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Keep-alive check (client only)
    Ping,
    /// Post a message (client only)
    Message,
    /// React to a message (client only)
    AddReaction,
    /// Withdraw a reaction (client only)
    RemoveReaction,
    /// Typing indicator on (client; fanned out under the same name)
    TypingStart,
    /// Typing indicator off (client; fanned out under the same name)
    TypingStop,
    /// Sent once after the upgrade (server only)
    Connected,
    /// Answer to `ping` (server only)
    Pong,
    /// A request on this connection failed (server only)
    Error,
}

impl FrameType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Message => "message",
            Self::AddReaction => "add_reaction",
            Self::RemoveReaction => "remove_reaction",
            Self::TypingStart => "typing_start",
            Self::TypingStop => "typing_stop",
            Self::Connected => "connected",
            Self::Pong => "pong",
            Self::Error => "error",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ping" => Some(Self::Ping),
            "message" => Some(Self::Message),
            "add_reaction" => Some(Self::AddReaction),
            "remove_reaction" => Some(Self::RemoveReaction),
            "typing_start" => Some(Self::TypingStart),
            "typing_stop" => Some(Self::TypingStop),
            "connected" => Some(Self::Connected),
            "pong" => Some(Self::Pong),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
