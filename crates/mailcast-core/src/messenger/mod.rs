//! Push delivery to the messaging platform.
//!
//! The [`Messenger`] trait abstracts the chat platform's bot API: pushing
//! text messages to a target and probing group metadata and membership.

use async_trait::async_trait;
use thiserror::Error;

/// Messenger errors
#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("Failed to push message: {0}")]
    SendFailed(String),

    #[error("Request to messaging platform failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected response from messaging platform: {0}")]
    UnexpectedResponse(String),
}

/// Summary of a group chat as reported by the messaging platform.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    /// Platform identifier of the group
    pub target_id: String,
    /// Human-readable group name
    pub name: String,
}

/// Trait for pushing messages and probing chat targets.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Push a text message to a chat target (user or group).
    async fn send(&self, target_id: &str, text: &str) -> Result<(), MessengerError>;

    /// Fetch the summary of a group chat.
    async fn get_group_summary(&self, target_id: &str) -> Result<GroupSummary, MessengerError>;

    /// Check whether a platform subject is currently a member of a group.
    async fn check_membership(
        &self,
        target_id: &str,
        subject_id: &str,
    ) -> Result<bool, MessengerError>;
}

#[cfg(feature = "http-client")]
mod http;

#[cfg(feature = "http-client")]
pub use http::HttpMessenger;
