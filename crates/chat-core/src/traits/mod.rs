//! Ports implemented by the infrastructure crates

mod collaborators;
mod repositories;

pub use collaborators::{
    EventPublisher, IdentityService, Integration, IntegrationLookup, TokenVerifier, UserProfile,
    VerifiedToken,
};
pub use repositories::{ChannelRepository, InviteRepository, RepoResult};
