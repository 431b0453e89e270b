//! Integration lookup: HTTP adapter and in-memory double

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chat_core::traits::{Integration, IntegrationLookup};
use chat_core::{DomainError, Snowflake};
use chrono::Utc;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use tracing::instrument;

use super::{check_status, external, http_client, join_url, transport_error};

const SERVICE: &str = "integrations";

/// Integration registry reached over HTTP (`GET {base}/integrations/{id}`)
#[derive(Debug, Clone)]
pub struct HttpIntegrationLookup {
    client: Client,
    base_url: String,
}

impl HttpIntegrationLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        Ok(Self {
            client: http_client(SERVICE, timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl IntegrationLookup for HttpIntegrationLookup {
    #[instrument(skip(self))]
    async fn get_integration(&self, id: Snowflake) -> Result<Integration, DomainError> {
        let response = self
            .client
            .get(join_url(&self.base_url, &format!("integrations/{id}")))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, &e))?;

        let response = check_status(SERVICE, response)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(DomainError::IntegrationNotFound(id));
        }

        response
            .json::<Integration>()
            .await
            .map_err(|e| external(SERVICE, format!("invalid integration payload: {e}")))
    }
}

#[derive(Debug, Default)]
pub struct MemoryIntegrationLookup {
    integrations: RwLock<HashMap<Snowflake, Integration>>,
}

impl MemoryIntegrationLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, integration: Integration) {
        self.integrations.write().insert(integration.id, integration);
    }

    /// Register an active integration
    pub fn with_integration(self, id: Snowflake, service_name: &str) -> Self {
        self.insert(Integration {
            id,
            service_name: service_name.to_string(),
            created_at: Utc::now(),
            is_revoked: false,
        });
        self
    }

    /// Mark an integration revoked; returns `false` if it is unknown
    pub fn revoke(&self, id: Snowflake) -> bool {
        match self.integrations.write().get_mut(&id) {
            Some(integration) => {
                integration.is_revoked = true;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IntegrationLookup for MemoryIntegrationLookup {
    async fn get_integration(&self, id: Snowflake) -> Result<Integration, DomainError> {
        self.integrations
            .read()
            .get(&id)
            .cloned()
            .ok_or(DomainError::IntegrationNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke() {
        let lookup = MemoryIntegrationLookup::new().with_integration(Snowflake::new(5), "ci");
        assert!(!lookup.get_integration(Snowflake::new(5)).await.unwrap().is_revoked);

        assert!(lookup.revoke(Snowflake::new(5)));
        assert!(lookup.get_integration(Snowflake::new(5)).await.unwrap().is_revoked);
        assert!(!lookup.revoke(Snowflake::new(6)));
    }
}
