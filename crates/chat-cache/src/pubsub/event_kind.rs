//! Names of the events carried on the bus.
//!
//! The name becomes the `type` of the frame delivered to clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel-scoped real-time events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewMessage,
    ReactionAdded,
    ReactionRemoved,
    /// Ephemeral, never persisted
    TypingStart,
    /// Ephemeral, never persisted
    TypingStop,
    /// A user became a member; hubs add the user's sessions to the channel
    UserJoined,
    /// A user left; hubs drop the user's sessions from the channel
    UserLeft,
    /// Topic or archive state changed
    ChannelUpdated,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewMessage => "new_message",
            Self::ReactionAdded => "reaction_added",
            Self::ReactionRemoved => "reaction_removed",
            Self::TypingStart => "typing_start",
            Self::TypingStop => "typing_stop",
            Self::UserJoined => "user_joined",
            Self::UserLeft => "user_left",
            Self::ChannelUpdated => "channel_updated",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "new_message" => Some(Self::NewMessage),
            "reaction_added" => Some(Self::ReactionAdded),
            "reaction_removed" => Some(Self::ReactionRemoved),
            "typing_start" => Some(Self::TypingStart),
            "typing_stop" => Some(Self::TypingStop),
            "user_joined" => Some(Self::UserJoined),
            "user_left" => Some(Self::UserLeft),
            "channel_updated" => Some(Self::ChannelUpdated),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
