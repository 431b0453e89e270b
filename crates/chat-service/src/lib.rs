//! # chat-service
//!
//! Application layer: every use case loads an aggregate, lets it validate
//! and mutate, saves it with the version check, then hands the buffered
//! domain events to the event sink. Also home of the request/response DTOs
//! and the adapters for the external collaborators.

pub mod adapters;
pub mod dto;
pub mod services;

pub use adapters::{
    HttpEventPublisher, HttpIdentityService, HttpIntegrationLookup, LoggingEventPublisher,
    MemoryIdentityService, MemoryIntegrationLookup, RecordingEventPublisher,
};
pub use dto::*;
pub use services::{
    ChannelService, Enricher, InviteService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult,
};
