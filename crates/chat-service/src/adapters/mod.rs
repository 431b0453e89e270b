//! Adapters for the external collaborators
//!
//! One reqwest-backed production adapter and one in-memory double per
//! collaborator trait from `chat_core::traits`. Token verification lives in
//! `chat_common::auth`.

mod events;
mod identity;
mod integrations;

pub use events::{HttpEventPublisher, LoggingEventPublisher, RecordingEventPublisher};
pub use identity::{HttpIdentityService, MemoryIdentityService};
pub use integrations::{HttpIntegrationLookup, MemoryIntegrationLookup};

use std::time::Duration;

use chat_core::DomainError;
use reqwest::{Client, Response, StatusCode};

/// Client shared by one adapter; the per-request timeout is enforced here
/// as well as by the caller's `tokio::time::timeout`.
fn http_client(service: &'static str, timeout: Duration) -> Result<Client, DomainError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| external(service, format!("failed to build HTTP client: {e}")))
}

fn external(service: &'static str, message: impl Into<String>) -> DomainError {
    DomainError::ExternalService {
        service,
        message: message.into(),
    }
}

/// Map transport failures; reqwest's own timeout becomes `ExternalTimeout`
fn transport_error(service: &'static str, err: &reqwest::Error) -> DomainError {
    if err.is_timeout() {
        DomainError::ExternalTimeout(service)
    } else {
        external(service, err.to_string())
    }
}

/// Turn a non-2xx response into an error. `404` is left to the caller,
/// which knows which resource was missing.
fn check_status(service: &'static str, response: Response) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() || status == StatusCode::NOT_FOUND {
        Ok(response)
    } else {
        Err(external(service, format!("unexpected status {status}")))
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
