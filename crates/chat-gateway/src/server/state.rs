//! Gateway state
//!
//! Application state for the gateway server.

use crate::broadcast::Fanout;
use crate::connection::ConnectionManager;
use chat_common::HubConfig;
use chat_core::TokenVerifier;
use chat_db::PgPool;
use chat_service::ServiceContext;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with repositories and collaborators
    service_context: Arc<ServiceContext>,
    /// Live connections and their indexes
    connection_manager: Arc<ConnectionManager>,
    /// Outbound event distribution
    fanout: Arc<Fanout>,
    /// Verifies the token presented on upgrade
    verifier: Arc<dyn TokenVerifier>,
    /// Pinged by the readiness check, absent with in-memory storage
    database: Option<PgPool>,
    hub: HubConfig,
}

impl GatewayState {
    pub fn new(
        service_context: ServiceContext,
        fanout: Arc<Fanout>,
        verifier: Arc<dyn TokenVerifier>,
        hub: HubConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            connection_manager: fanout.connections().clone(),
            fanout,
            verifier,
            database: None,
            hub,
        }
    }

    #[must_use]
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    pub fn fanout(&self) -> &Fanout {
        &self.fanout
    }

    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.verifier.as_ref()
    }

    pub fn database(&self) -> Option<&PgPool> {
        self.database.as_ref()
    }

    pub fn hub(&self) -> &HubConfig {
        &self.hub
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("fanout", &self.fanout)
            .field("hub", &self.hub)
            .finish_non_exhaustive()
    }
}
