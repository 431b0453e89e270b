//! Path parameter extractors
//!
//! Snowflake ids in paths are parsed during extraction, so handlers never
//! see a malformed id.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use chat_core::Snowflake;
use serde::{de::DeserializeOwned, Deserialize};

use crate::response::ApiError;

/// `Path` with rejections mapped to [`ApiError::InvalidPath`]
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        Ok(ApiPath(inner))
    }
}

/// `/channels/:channel_id/…`
#[derive(Debug, Deserialize)]
pub struct ChannelPath {
    pub channel_id: Snowflake,
}

/// `/channels/:channel_id/messages/:message_id/reactions/:reaction_type`
#[derive(Debug, Deserialize)]
pub struct ReactionPath {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub reaction_type: String,
}

/// `/invites/:code`
#[derive(Debug, Deserialize)]
pub struct InviteCodePath {
    pub code: String,
}
