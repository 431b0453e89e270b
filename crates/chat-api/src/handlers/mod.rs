//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod channels;
pub mod health;
pub mod invites;
pub mod messages;
pub mod reactions;
