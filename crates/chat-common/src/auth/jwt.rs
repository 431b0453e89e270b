//! JWT token verification
//!
//! Tokens are issued by the external identity provider; this service only
//! needs the shared HS256 key, which is injected at construction and lives
//! as long as the service. `issue` exists for local tooling and tests.

use chat_core::{DomainError, Snowflake, TokenVerifier, VerifiedToken};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Get the user ID as a Snowflake
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

/// HS256 token verifier
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl JwtService {
    /// Create a verifier for `secret`, optionally pinned to an issuer
    #[must_use]
    pub fn new(secret: &str, issuer: Option<String>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::default();
        validation.leeway = leeway_seconds;
        if let Some(iss) = &issuer {
            validation.set_issuer(&[iss.as_str()]);
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer,
        }
    }

    #[must_use]
    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, config.issuer.clone(), config.leeway_seconds)
    }

    /// Issue a token for `user_id` valid for `ttl`
    pub fn issue(&self, user_id: Snowflake, email: &str, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))
    }

    /// Decode and validate a JWT token
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                    _ => AppError::InvalidToken,
                }
            })?;

        Ok(token_data.claims)
    }
}

impl TokenVerifier for JwtService {
    fn verify(&self, token: &str) -> Result<VerifiedToken, DomainError> {
        let claims = self
            .decode_token(token)
            .map_err(|e| DomainError::AuthenticationFailed(e.to_string()))?;
        let user_id = claims
            .user_id()
            .map_err(|e| DomainError::AuthenticationFailed(e.to_string()))?;

        Ok(VerifiedToken {
            user_id,
            email: claims.email,
        })
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}
