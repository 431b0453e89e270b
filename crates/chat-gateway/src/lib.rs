//! # chat-gateway
//!
//! WebSocket hub for real-time channel traffic.
//!
//! Clients connect to `/ws` with a bearer token, get indexed under every
//! channel they belong to and exchange `{type, payload}` frames. Posts,
//! reactions and typing indicators go through the channel service and are
//! fanned out over the message bus, so several hub instances can serve the
//! same channels.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, GatewayState};
