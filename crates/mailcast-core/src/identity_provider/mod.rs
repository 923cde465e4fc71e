//! External identity provider integration.
//!
//! Login never carries a local credential: the caller presents an opaque
//! login artifact and the provider exchanges it for the platform subject
//! behind it.

use async_trait::async_trait;
use thiserror::Error;

/// Identity provider errors
#[derive(Debug, Error)]
pub enum IdentityProviderError {
    #[error("Failed to exchange login artifact: {0}")]
    ExchangeFailed(String),

    #[error("Unexpected response from identity provider: {0}")]
    UnexpectedResponse(String),
}

/// Profile of the authenticated platform subject.
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    /// Stable identifier assigned by the platform
    pub subject_id: String,
    /// Display name, when the platform exposes one
    pub display_name: Option<String>,
}

/// Trait for exchanging a login artifact for the subject behind it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange(&self, artifact: &str) -> Result<IdentityProfile, IdentityProviderError>;
}

#[cfg(feature = "http-client")]
mod http;

#[cfg(feature = "http-client")]
pub use http::HttpIdentityProvider;
