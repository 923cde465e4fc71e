//! Relay configuration module.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! # Messaging platform (push channel)
//! MAILCAST_MESSAGING_BASE_URL=https://api.example-chat.com
//! MAILCAST_MESSAGING_TOKEN=channel_access_token
//!
//! # Channel-token authorization service
//! MAILCAST_TOKEN_API_BASE_URL=https://notify.example-chat.com
//! MAILCAST_TOKEN_API_CLIENT_ID=client_id
//! MAILCAST_TOKEN_API_CLIENT_SECRET=client_secret
//!
//! # Identity provider (login)
//! MAILCAST_IDENTITY_BASE_URL=https://login.example-chat.com
//! MAILCAST_IDENTITY_CLIENT_ID=client_id
//! MAILCAST_IDENTITY_CLIENT_SECRET=client_secret
//! MAILCAST_IDENTITY_REDIRECT_URI=https://relay.example.com/auth/callback
//!
//! # Optional event-bus side-channel
//! MAILCAST_SIDE_CHANNEL_TOPIC=mailcast/notify
//! ```

use std::env;
use thiserror::Error;

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub messaging: MessagingConfig,
    pub token_api: TokenApiConfig,
    pub identity: IdentityConfig,
    pub side_channel: Option<SideChannelConfig>,
}

/// Messaging platform configuration
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    /// Base URL of the messaging platform API
    pub base_url: String,
    /// Channel access token for transport-level auth
    pub channel_token: String,
}

/// Channel-token authorization service configuration
#[derive(Debug, Clone)]
pub struct TokenApiConfig {
    /// Base URL of the authorization service
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Identity provider configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Base URL of the identity provider
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI registered for the login flow
    pub redirect_uri: String,
}

/// Event-bus side-channel configuration
#[derive(Debug, Clone)]
pub struct SideChannelConfig {
    /// Topic the dispatch gateway publishes notification events on
    pub topic: String,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid base URL in {0}: expected http:// or https://")]
    InvalidBaseUrl(String),
}

fn require(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn require_base_url(name: &str) -> Result<String, ConfigError> {
    let value = require(name)?;
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::InvalidBaseUrl(name.to_string()));
    }
    Ok(value.trim_end_matches('/').to_string())
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let messaging = MessagingConfig {
            base_url: require_base_url("MAILCAST_MESSAGING_BASE_URL")?,
            channel_token: require("MAILCAST_MESSAGING_TOKEN")?,
        };

        let token_api = TokenApiConfig {
            base_url: require_base_url("MAILCAST_TOKEN_API_BASE_URL")?,
            client_id: require("MAILCAST_TOKEN_API_CLIENT_ID")?,
            client_secret: require("MAILCAST_TOKEN_API_CLIENT_SECRET")?,
        };

        let identity = IdentityConfig {
            base_url: require_base_url("MAILCAST_IDENTITY_BASE_URL")?,
            client_id: require("MAILCAST_IDENTITY_CLIENT_ID")?,
            client_secret: require("MAILCAST_IDENTITY_CLIENT_SECRET")?,
            redirect_uri: require("MAILCAST_IDENTITY_REDIRECT_URI")?,
        };

        let side_channel = env::var("MAILCAST_SIDE_CHANNEL_TOPIC")
            .ok()
            .filter(|topic| !topic.is_empty())
            .map(|topic| SideChannelConfig { topic });

        Ok(Self {
            messaging,
            token_api,
            identity,
            side_channel,
        })
    }
}
