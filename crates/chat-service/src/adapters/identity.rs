//! Identity lookup: HTTP adapter and in-memory double

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chat_core::traits::{IdentityService, UserProfile};
use chat_core::{DomainError, Snowflake};
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::instrument;

use super::{check_status, external, http_client, join_url, transport_error};

const SERVICE: &str = "identity";

/// Identity service reached over HTTP
///
/// `GET {base}/users/{id}` for one profile and `POST {base}/users/batch`
/// with `{"ids": [...]}` for many.
#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    ids: &'a [Snowflake],
}

impl HttpIdentityService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        Ok(Self {
            client: http_client(SERVICE, timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    #[instrument(skip(self))]
    async fn get_user_by_id(&self, id: Snowflake) -> Result<UserProfile, DomainError> {
        let response = self
            .client
            .get(join_url(&self.base_url, &format!("users/{id}")))
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, &e))?;

        let response = check_status(SERVICE, response)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(DomainError::UserNotFound(id));
        }

        response
            .json::<UserProfile>()
            .await
            .map_err(|e| external(SERVICE, format!("invalid user payload: {e}")))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_users(&self, ids: &[Snowflake]) -> Result<Vec<UserProfile>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(join_url(&self.base_url, "users/batch"))
            .json(&BatchRequest { ids })
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, &e))?;

        let response = check_status(SERVICE, response)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        response
            .json::<Vec<UserProfile>>()
            .await
            .map_err(|e| external(SERVICE, format!("invalid user batch payload: {e}")))
    }
}

/// In-memory identity service for tests and local runs
#[derive(Debug, Default)]
pub struct MemoryIdentityService {
    users: RwLock<HashMap<Snowflake, UserProfile>>,
    delay: RwLock<Option<Duration>>,
}

impl MemoryIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: UserProfile) {
        self.users.write().insert(profile.id, profile);
    }

    /// Register a user named `username` with an `example.test` address
    pub fn with_user(self, id: Snowflake, username: &str, first_name: &str, last_name: &str) -> Self {
        self.insert(UserProfile {
            id,
            username: username.to_string(),
            email: format!("{username}@example.test"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        });
        self
    }

    /// Make every lookup sleep first, to exercise caller timeouts
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write() = delay;
    }

    async fn wait(&self) {
        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl IdentityService for MemoryIdentityService {
    async fn get_user_by_id(&self, id: Snowflake) -> Result<UserProfile, DomainError> {
        self.wait().await;
        self.users
            .read()
            .get(&id)
            .cloned()
            .ok_or(DomainError::UserNotFound(id))
    }

    async fn get_users(&self, ids: &[Snowflake]) -> Result<Vec<UserProfile>, DomainError> {
        self.wait().await;
        let users = self.users.read();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}
