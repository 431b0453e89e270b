//! Service context - dependency container for services
//!
//! Holds the aggregate repositories, the id generator and the external
//! collaborators. Every collaborator call goes through [`ServiceContext::call`]
//! so it is bounded by the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chat_core::traits::{
    ChannelRepository, EventPublisher, IdentityService, IntegrationLookup, InviteRepository,
};
use chat_core::{DomainError, DomainEvent, Snowflake, SnowflakeGenerator};
use chat_common::ServicesConfig;
use tracing::{debug, error, warn};

use crate::adapters::{
    HttpEventPublisher, HttpIdentityService, HttpIntegrationLookup, LoggingEventPublisher,
    MemoryIdentityService, MemoryIntegrationLookup,
};

use super::error::{ServiceError, ServiceResult};

/// Default bound on a single collaborator call
pub const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Service context containing all dependencies
///
/// Cloning is cheap; every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    channel_repo: Arc<dyn ChannelRepository>,
    invite_repo: Arc<dyn InviteRepository>,

    // Collaborators
    identity: Arc<dyn IdentityService>,
    integrations: Arc<dyn IntegrationLookup>,
    events: Arc<dyn EventPublisher>,

    snowflake_generator: Arc<SnowflakeGenerator>,
    collaborator_timeout: Duration,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the channel repository
    pub fn channel_repo(&self) -> &dyn ChannelRepository {
        self.channel_repo.as_ref()
    }

    /// Get the invite repository
    pub fn invite_repo(&self) -> &dyn InviteRepository {
        self.invite_repo.as_ref()
    }

    // === Collaborators ===

    pub fn identity(&self) -> &dyn IdentityService {
        self.identity.as_ref()
    }

    pub fn integrations(&self) -> &dyn IntegrationLookup {
        self.integrations.as_ref()
    }

    pub fn collaborator_timeout(&self) -> Duration {
        self.collaborator_timeout
    }

    /// Run a collaborator call under the configured timeout
    pub async fn call<T, F>(&self, service: &'static str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match tokio::time::timeout(self.collaborator_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::ExternalTimeout(service)),
        }
    }

    /// Hand events to the sink. Failures are logged and never retried; the
    /// state they describe is already committed.
    pub async fn publish_events(&self, events: Vec<DomainEvent>) {
        if events.is_empty() {
            return;
        }

        match self.call("events", self.events.publish_events(&events)).await {
            Ok(()) => debug!(count = events.len(), "domain events published"),
            Err(e) => error!(
                error = %e,
                count = events.len(),
                first = events[0].name(),
                aggregate_id = %events[0].aggregate_id,
                "failed to publish domain events"
            ),
        }
    }

    // === Ids ===

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("collaborators", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("collaborator_timeout", &self.collaborator_timeout)
            .finish()
    }
}

/// Builder for creating ServiceContext
///
/// Repositories, identity and integration lookup are required. The event
/// sink defaults to [`LoggingEventPublisher`], the id generator to worker 0
/// and the timeout to [`DEFAULT_COLLABORATOR_TIMEOUT`].
#[derive(Default)]
pub struct ServiceContextBuilder {
    channel_repo: Option<Arc<dyn ChannelRepository>>,
    invite_repo: Option<Arc<dyn InviteRepository>>,
    identity: Option<Arc<dyn IdentityService>>,
    integrations: Option<Arc<dyn IntegrationLookup>>,
    events: Option<Arc<dyn EventPublisher>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    collaborator_timeout: Option<Duration>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_repo(mut self, repo: Arc<dyn ChannelRepository>) -> Self {
        self.channel_repo = Some(repo);
        self
    }

    pub fn invite_repo(mut self, repo: Arc<dyn InviteRepository>) -> Self {
        self.invite_repo = Some(repo);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityService>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn integrations(mut self, integrations: Arc<dyn IntegrationLookup>) -> Self {
        self.integrations = Some(integrations);
        self
    }

    pub fn event_publisher(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn collaborator_timeout(mut self, timeout: Duration) -> Self {
        self.collaborator_timeout = Some(timeout);
        self
    }

    /// Pick the collaborator adapters from configuration
    ///
    /// A configured base URL selects the HTTP adapter; a missing one selects
    /// the in-memory lookup (or the logging publisher for events). The
    /// request timeout doubles as the collaborator timeout.
    pub fn collaborators(mut self, services: &ServicesConfig) -> ServiceResult<Self> {
        let timeout = services.request_timeout();

        self.identity = Some(match &services.identity_url {
            Some(url) => Arc::new(HttpIdentityService::new(url.as_str(), timeout)?),
            None => {
                warn!("IDENTITY_SERVICE_URL not set, using in-memory identity lookup");
                Arc::new(MemoryIdentityService::new())
            }
        });
        self.integrations = Some(match &services.integrations_url {
            Some(url) => Arc::new(HttpIntegrationLookup::new(url.as_str(), timeout)?),
            None => {
                warn!("INTEGRATION_SERVICE_URL not set, using in-memory integration lookup");
                Arc::new(MemoryIntegrationLookup::new())
            }
        });
        self.events = Some(match &services.events_url {
            Some(url) => Arc::new(HttpEventPublisher::new(url.as_str(), timeout)?),
            None => Arc::new(LoggingEventPublisher),
        });
        self.collaborator_timeout = Some(timeout);

        Ok(self)
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            channel_repo: self
                .channel_repo
                .ok_or_else(|| ServiceError::validation("channel_repo is required"))?,
            invite_repo: self
                .invite_repo
                .ok_or_else(|| ServiceError::validation("invite_repo is required"))?,
            identity: self
                .identity
                .ok_or_else(|| ServiceError::validation("identity is required"))?,
            integrations: self
                .integrations
                .ok_or_else(|| ServiceError::validation("integrations is required"))?,
            events: self
                .events
                .unwrap_or_else(|| Arc::new(LoggingEventPublisher)),
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            collaborator_timeout: self
                .collaborator_timeout
                .unwrap_or(DEFAULT_COLLABORATOR_TIMEOUT),
        })
    }
}
