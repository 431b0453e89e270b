//! # chat-api
//!
//! HTTP command surface for channels, messages, reactions and invites.
//!
//! Every route under `/api/v1` takes a bearer token. Commands go through
//! the same services as the WebSocket gateway; those that produce
//! real-time events also push them to the message bus so connected
//! clients see HTTP-originated changes.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run};
pub use state::AppState;
