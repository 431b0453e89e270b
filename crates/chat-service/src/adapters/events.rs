//! Event sinks

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chat_core::traits::EventPublisher;
use chat_core::{DomainError, DomainEvent};
use parking_lot::Mutex;
use reqwest::Client;
use tracing::{info, instrument};

use super::{check_status, external, http_client, join_url, transport_error};

const SERVICE: &str = "events";

/// Downstream ingestion endpoint: `POST {base}/events` with a JSON array of
/// event envelopes
#[derive(Debug, Clone)]
pub struct HttpEventPublisher {
    client: Client,
    base_url: String,
}

impl HttpEventPublisher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        Ok(Self {
            client: http_client(SERVICE, timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl EventPublisher for HttpEventPublisher {
    #[instrument(skip(self, events), fields(count = events.len()))]
    async fn publish_events(&self, events: &[DomainEvent]) -> Result<(), DomainError> {
        let response = self
            .client
            .post(join_url(&self.base_url, "events"))
            .json(events)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, &e))?;

        let response = check_status(SERVICE, response)?;
        if !response.status().is_success() {
            return Err(external(SERVICE, "events endpoint not found"));
        }
        Ok(())
    }
}

/// Sink used when no ingestion endpoint is configured: one log line per
/// event
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventPublisher;

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish_events(&self, events: &[DomainEvent]) -> Result<(), DomainError> {
        for event in events {
            info!(
                event_id = %event.id,
                name = event.name(),
                aggregate_type = %event.aggregate_type,
                aggregate_id = %event.aggregate_id,
                version = event.aggregate_version,
                "domain event"
            );
        }
        Ok(())
    }
}

/// Test double that keeps every published event
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<DomainEvent>>,
    fail_next: AtomicBool,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next publish call
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    /// Names of the recorded events, in publish order
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(DomainEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish_events(&self, events: &[DomainEvent]) -> Result<(), DomainError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(external(SERVICE, "rejected by test double"));
        }
        self.events.lock().extend_from_slice(events);
        Ok(())
    }
}
