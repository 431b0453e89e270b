//! Use cases
//!
//! Services are cheap, borrowed views over a [`ServiceContext`]; build one
//! per request.

pub mod channel;
pub mod context;
pub mod enrichment;
pub mod error;
pub mod invite;

pub use channel::ChannelService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use enrichment::Enricher;
pub use error::{ServiceError, ServiceResult};
pub use invite::InviteService;

#[cfg(test)]
pub(crate) mod test_support;
