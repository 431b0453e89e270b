//! Pub/Sub topic naming.
//!
//! Every chat channel has one topic, `channel:{id}`; subscribers listen on
//! the `channel:*` pattern.

use chat_core::Snowflake;

/// Topic prefix for channel-scoped events
pub const CHANNEL_PREFIX: &str = "channel:";
/// Pattern matching every channel topic
pub const CHANNEL_PATTERN: &str = "channel:*";

/// Topic name for `channel_id`
#[must_use]
pub fn channel_topic(channel_id: Snowflake) -> String {
    format!("{CHANNEL_PREFIX}{channel_id}")
}

/// Channel id encoded in a topic name, if it is a channel topic
#[must_use]
pub fn parse_channel_topic(name: &str) -> Option<Snowflake> {
    name.strip_prefix(CHANNEL_PREFIX)?
        .parse::<i64>()
        .ok()
        .map(Snowflake::new)
}
