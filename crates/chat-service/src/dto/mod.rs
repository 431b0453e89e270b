//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API and gateway inputs
//! - Response DTOs for serializing outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CreateChannelRequest, CreateInviteRequest, CreateMessageRequest, CreateNotificationRequest,
    MarkReadRequest, MessageHistoryQuery, ReactionRequest, UpdateTopicRequest,
};

pub use responses::{
    ApiResponse, ArchiveResponse, ChannelResponse, HealthChecks, HealthResponse,
    IntegrationSummary, InviteResponse, MemberResponse, MembershipEventResponse,
    MessageResponse, PaginatedResponse, PaginationMeta, ReactionEventResponse, ReactionResponse,
    ReadMarkerResponse, ReadinessResponse, UserSummary,
};
