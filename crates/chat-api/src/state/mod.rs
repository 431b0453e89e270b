//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the token verifier and, when Redis is configured, the message bus that
//! carries HTTP-originated events to the gateways.

use std::sync::Arc;

use chat_cache::{BusEnvelope, EventKind, MessageBus, RecentMessages};
use chat_core::{Snowflake, TokenVerifier};
use chat_db::PgPool;
use chat_service::ServiceContext;
use serde::Serialize;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Verifies bearer tokens
    verifier: Arc<dyn TokenVerifier>,
    /// Real-time fan-out, absent in single-instance mode
    bus: Option<Arc<dyn MessageBus>>,
    /// Newest messages per channel, filled by the caching bus
    recent_messages: Option<Arc<dyn RecentMessages>>,
    /// Pinged by the readiness check
    database: Option<PgPool>,
}

impl AppState {
    pub fn new(service_context: ServiceContext, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            service_context: Arc::new(service_context),
            verifier,
            bus: None,
            recent_messages: None,
            database: None,
        }
    }

    #[must_use]
    pub fn with_bus(mut self, bus: Arc<dyn MessageBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    #[must_use]
    pub fn with_recent_messages(mut self, recent: Arc<dyn RecentMessages>) -> Self {
        self.recent_messages = Some(recent);
        self
    }

    #[must_use]
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.verifier.as_ref()
    }

    pub fn bus(&self) -> Option<&Arc<dyn MessageBus>> {
        self.bus.as_ref()
    }

    pub fn recent_messages(&self) -> Option<&dyn RecentMessages> {
        self.recent_messages.as_deref()
    }

    pub fn database(&self) -> Option<&PgPool> {
        self.database.as_ref()
    }

    /// Push a real-time event for the channel's subscribers
    ///
    /// Best effort: the command already succeeded, so failures are only
    /// logged.
    pub async fn push<T: Serialize>(&self, channel_id: Snowflake, kind: EventKind, payload: &T) {
        let Some(bus) = &self.bus else {
            tracing::debug!(channel_id = %channel_id, event_type = %kind, "No bus, event not pushed");
            return;
        };

        let envelope = match BusEnvelope::encode(channel_id, kind, payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(channel_id = %channel_id, event_type = %kind, error = %e, "Failed to encode event");
                return;
            }
        };

        if let Err(e) = bus.publish(&envelope).await {
            tracing::warn!(
                channel_id = %channel_id,
                event_type = %kind,
                error = %e,
                "Failed to push event to the bus"
            );
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("bus", &self.bus.is_some())
            .field("recent_messages", &self.recent_messages.is_some())
            .field("database", &self.database.is_some())
            .finish()
    }
}
