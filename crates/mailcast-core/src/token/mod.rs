//! Channel-token lifecycle.
//!
//! Every enabled address carries a channel token issued by an external
//! authorization service. The [`TokenApi`] trait covers the raw service
//! calls and [`TokenManager`] wraps them with the relay's semantics:
//! revoking a token that is already dead is not an error.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Token service errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to issue channel token: {0}")]
    IssueFailed(String),

    #[error("Failed to revoke channel token: {0}")]
    RevokeFailed(String),

    #[error("Failed to query channel token status: {0}")]
    StatusFailed(String),
}

/// Trait for the external channel-token authorization service.
#[async_trait]
pub trait TokenApi: Send + Sync {
    /// Issue a fresh channel token.
    async fn issue(&self) -> Result<String, TokenError>;

    /// Revoke a token. Returns `false` when the service reports the token
    /// was already revoked or expired.
    async fn revoke(&self, token: &str) -> Result<bool, TokenError>;

    /// Check whether a token is still valid.
    async fn status(&self, token: &str) -> Result<bool, TokenError>;
}

/// Token manager applying relay semantics on top of a [`TokenApi`].
#[derive(Clone)]
pub struct TokenManager {
    api: Arc<dyn TokenApi>,
}

impl TokenManager {
    pub fn new(api: Arc<dyn TokenApi>) -> Self {
        Self { api }
    }

    /// Issue a fresh channel token.
    pub async fn issue(&self) -> Result<String, TokenError> {
        self.api.issue().await
    }

    /// Revoke a token. A token the service no longer recognizes counts
    /// as revoked.
    pub async fn revoke(&self, token: &str) -> Result<(), TokenError> {
        if !self.api.revoke(token).await? {
            debug!("channel token was already revoked");
        }
        Ok(())
    }

    /// Check whether a token is still valid.
    pub async fn status(&self, token: &str) -> Result<bool, TokenError> {
        self.api.status(token).await
    }
}

#[cfg(feature = "http-client")]
mod http;

#[cfg(feature = "http-client")]
pub use http::HttpTokenApi;
