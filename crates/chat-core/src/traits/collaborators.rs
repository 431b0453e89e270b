//! External collaborators consumed by the application layer
//!
//! Each trait has one production adapter (HTTP / JWT) and one in-memory
//! double living next to the services that use it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::events::DomainEvent;
use crate::value_objects::Snowflake;

// ============================================================================
// Token verification
// ============================================================================

/// Identity proven by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedToken {
    pub user_id: Snowflake,
    pub email: String,
}

pub trait TokenVerifier: Send + Sync {
    /// Verify `token`; invalid or expired tokens yield
    /// [`DomainError::AuthenticationFailed`]
    fn verify(&self, token: &str) -> Result<VerifiedToken, DomainError>;
}

// ============================================================================
// Identity lookup
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Snowflake,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserProfile {
    /// "First Last", or the username when both are blank
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn get_user_by_id(&self, id: Snowflake) -> Result<UserProfile, DomainError>;

    /// Profiles for `ids`; unknown ids are skipped
    async fn get_users(&self, ids: &[Snowflake]) -> Result<Vec<UserProfile>, DomainError>;
}

// ============================================================================
// Integration lookup
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    pub id: Snowflake,
    pub service_name: String,
    pub created_at: DateTime<Utc>,
    pub is_revoked: bool,
}

#[async_trait]
pub trait IntegrationLookup: Send + Sync {
    async fn get_integration(&self, id: Snowflake) -> Result<Integration, DomainError>;
}

// ============================================================================
// Event publishing
// ============================================================================

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Hand events to the downstream pipeline. Callers log failures and do
    /// not retry.
    async fn publish_events(&self, events: &[DomainEvent]) -> Result<(), DomainError>;
}
