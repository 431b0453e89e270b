//! Outbound event fan-out
//!
//! With a bus configured every event goes to the bus and reaches local
//! connections through the [`BusBridge`](super::BusBridge), like events from
//! any other instance. Without one, events are broadcast locally right away.

use crate::connection::ConnectionManager;
use crate::protocol::Frame;
use chat_cache::{BusEnvelope, EventKind, MessageBus};
use chat_core::Snowflake;
use serde::Deserialize;
use std::sync::Arc;

pub struct Fanout {
    connections: Arc<ConnectionManager>,
    bus: Option<Arc<dyn MessageBus>>,
}

impl Fanout {
    pub fn new(connections: Arc<ConnectionManager>, bus: Option<Arc<dyn MessageBus>>) -> Self {
        Self { connections, bus }
    }

    /// Single-instance fan-out with no bus
    pub fn local(connections: Arc<ConnectionManager>) -> Self {
        Self::new(connections, None)
    }

    pub fn bus(&self) -> Option<&Arc<dyn MessageBus>> {
        self.bus.as_ref()
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Publish an event to every subscriber of its channel
    ///
    /// A failed bus publish is logged and the event is delivered to this
    /// instance's connections only.
    pub async fn publish(&self, envelope: BusEnvelope) {
        let Some(bus) = &self.bus else {
            self.deliver_local(&envelope);
            return;
        };

        if let Err(e) = bus.publish(&envelope).await {
            tracing::error!(
                channel_id = %envelope.channel_id,
                event_type = %envelope.event_type,
                error = %e,
                "Bus publish failed, delivering locally only"
            );
            self.deliver_local(&envelope);
        }
    }

    /// Deliver an event to the local connections subscribed to its channel
    ///
    /// Membership events also update the channel index: a joining user's
    /// sessions are subscribed before delivery, a leaving user's sessions
    /// are dropped after it.
    pub fn deliver_local(&self, envelope: &BusEnvelope) -> usize {
        let channel_id = envelope.channel_id;
        let frame = Frame::from(envelope);

        match envelope.kind() {
            Some(EventKind::UserJoined) => {
                if let Some(user_id) = member_of(envelope) {
                    self.connections.subscribe_user(user_id, channel_id);
                }
                self.connections.broadcast_to_channel(channel_id, &frame)
            }
            Some(EventKind::UserLeft) => {
                let sent = self.connections.broadcast_to_channel(channel_id, &frame);
                if let Some(user_id) = member_of(envelope) {
                    self.connections.unsubscribe_user(user_id, channel_id);
                }
                sent
            }
            _ => self.connections.broadcast_to_channel(channel_id, &frame),
        }
    }
}

impl std::fmt::Debug for Fanout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fanout")
            .field("connections", &self.connections)
            .field("bus", &self.bus.is_some())
            .finish()
    }
}

fn member_of(envelope: &BusEnvelope) -> Option<Snowflake> {
    #[derive(Deserialize)]
    struct Membership {
        user_id: Snowflake,
    }

    match Membership::deserialize(&envelope.payload) {
        Ok(m) => Some(m.user_id),
        Err(e) => {
            tracing::warn!(
                channel_id = %envelope.channel_id,
                event_type = %envelope.event_type,
                error = %e,
                "Membership event without a user id"
            );
            None
        }
    }
}
