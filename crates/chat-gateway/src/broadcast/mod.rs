//! Event distribution
//!
//! Publishes outbound channel events to the bus (or locally) and bridges
//! bus events back to this instance's connections.

mod bridge;
mod fanout;

pub use bridge::BusBridge;
pub use fanout::Fanout;
