//! Shared fixture for service tests

use std::sync::Arc;

use chat_core::Snowflake;
use chat_db::MemoryChannelRepository;

use crate::adapters::{MemoryIdentityService, MemoryIntegrationLookup, RecordingEventPublisher};

use super::context::ServiceContext;

pub const ALICE: Snowflake = Snowflake::new(1001);
pub const BOB: Snowflake = Snowflake::new(1002);
pub const CAROL: Snowflake = Snowflake::new(1003);

pub struct Fixture {
    pub ctx: ServiceContext,
    pub identity: Arc<MemoryIdentityService>,
    pub integrations: Arc<MemoryIntegrationLookup>,
    pub events: Arc<RecordingEventPublisher>,
    pub integration_id: Snowflake,
}

impl Fixture {
    pub fn new() -> Self {
        let integration_id = Snowflake::new(9001);
        let identity = Arc::new(
            MemoryIdentityService::new()
                .with_user(ALICE, "alice", "Alice", "Liddell")
                .with_user(BOB, "bob", "Bob", ""),
        );
        let integrations =
            Arc::new(MemoryIntegrationLookup::new().with_integration(integration_id, "ci"));
        let events = Arc::new(RecordingEventPublisher::new());
        let channels = Arc::new(MemoryChannelRepository::new());

        let ctx = ServiceContext::builder()
            .invite_repo(channels.invites())
            .channel_repo(channels)
            .identity(identity.clone())
            .integrations(integrations.clone())
            .event_publisher(events.clone())
            .build()
            .unwrap();

        Self {
            ctx,
            identity,
            integrations,
            events,
            integration_id,
        }
    }
}
