//! Integration test utilities for the chat server
//!
//! This crate provides helpers for running end-to-end tests against
//! the REST API and WebSocket gateway, backed by in-memory storage and an
//! in-process bus.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
