//! Application error types
//!
//! Unified error handling for the binaries and their startup paths.

use chat_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidToken | Self::TokenExpired => 401,
            Self::Database(_) | Self::Cache(_) | Self::Internal(_) | Self::Config(_) => 500,
            Self::Domain(e) => domain_status(e),
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// HTTP status for a domain failure, shared by every transport.
#[must_use]
pub fn domain_status(e: &DomainError) -> u16 {
    if e.is_authentication() {
        401
    } else if e.is_authorization() {
        403
    } else if e.is_not_found() {
        404
    } else if e.is_validation() {
        400
    } else if e.is_conflict() {
        409
    } else if e.is_external() {
        502
    } else {
        500
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::Snowflake;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidToken.status_code(), 401);
        assert_eq!(AppError::TokenExpired.status_code(), 401);
        assert_eq!(AppError::Validation("test".to_string()).status_code(), 400);
        assert_eq!(AppError::Database("test".to_string()).status_code(), 500);
        assert_eq!(AppError::Config("test".to_string()).error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_domain_status_codes() {
        assert_eq!(AppError::from(DomainError::ChannelNotFound(Snowflake::new(1))).status_code(), 404);
        assert_eq!(AppError::from(DomainError::NotChannelCreator).status_code(), 403);
        assert_eq!(
            AppError::from(DomainError::NotChannelMember(Snowflake::new(1))).status_code(),
            403
        );
        assert_eq!(AppError::from(DomainError::EmptyContent).status_code(), 400);
        assert_eq!(AppError::from(DomainError::AlreadyMember).status_code(), 409);
        assert_eq!(
            AppError::from(DomainError::AuthenticationFailed("bad".into())).status_code(),
            401
        );
        assert_eq!(
            AppError::from(DomainError::ExternalTimeout("identity")).status_code(),
            502
        );
    }

    #[test]
    fn test_domain_errors_keep_their_code() {
        let err = AppError::from(DomainError::ReactionAlreadyExists);
        assert_eq!(err.error_code(), "REACTION_ALREADY_EXISTS");

        let err = AppError::internal(std::io::Error::other("boom"));
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert_eq!(err.to_string(), "Internal server error");
    }
}
