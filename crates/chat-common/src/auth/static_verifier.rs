//! In-memory token verifier for tests and local runs

use std::collections::HashMap;

use chat_core::{DomainError, Snowflake, TokenVerifier, VerifiedToken};
use parking_lot::RwLock;

/// Verifier backed by a fixed token table
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: RwLock<HashMap<String, VerifiedToken>>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as proof of `user_id`
    pub fn insert(&self, token: impl Into<String>, user_id: Snowflake, email: impl Into<String>) {
        self.tokens.write().insert(
            token.into(),
            VerifiedToken {
                user_id,
                email: email.into(),
            },
        );
    }

    pub fn with_token(self, token: impl Into<String>, user_id: Snowflake) -> Self {
        self.insert(token, user_id, format!("user{user_id}@example.test"));
        self
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedToken, DomainError> {
        self.tokens
            .read()
            .get(token)
            .cloned()
            .ok_or_else(|| DomainError::AuthenticationFailed("unknown token".to_string()))
    }
}
