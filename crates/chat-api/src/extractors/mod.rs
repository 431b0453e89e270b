//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, paths and pagination.

mod auth;
mod pagination;
mod path;
mod validated;

pub use auth::AuthUser;
pub use pagination::{Pagination, PaginationParams};
pub use path::{ApiPath, ChannelPath, InviteCodePath, ReactionPath};
pub use validated::{OptionalValidatedJson, ValidatedJson};
