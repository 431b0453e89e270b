//! Redis Pub/Sub module.
//!
//! Cross-instance distribution of channel events.

mod channels;
mod event_kind;
mod publisher;
mod subscriber;

pub use channels::{channel_topic, parse_channel_topic, CHANNEL_PATTERN, CHANNEL_PREFIX};
pub use event_kind::EventKind;
pub use publisher::{BusEnvelope, Publisher};
pub use subscriber::{Subscriber, SubscriberConfig, SubscriberError, SubscriberResult};
