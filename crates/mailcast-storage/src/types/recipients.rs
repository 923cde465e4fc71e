//! Recipient types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::ids::RecipientId;

/// Dispatch target kind: a single user's private channel or a group channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecipientKind {
    Direct,
    Group,
}

/// Error type for parsing RecipientKind from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecipientKindError(pub String);

impl std::fmt::Display for ParseRecipientKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid recipient kind: {}", self.0)
    }
}

impl std::error::Error for ParseRecipientKindError {}

impl FromStr for RecipientKind {
    type Err = ParseRecipientKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(RecipientKind::Direct),
            "group" => Ok(RecipientKind::Group),
            _ => Err(ParseRecipientKindError(s.to_string())),
        }
    }
}

impl RecipientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientKind::Direct => "direct",
            RecipientKind::Group => "group",
        }
    }
}

/// Recipient record.
///
/// The platform target id is unique. Rows are append-only: recipients are
/// never hard-deleted once observed.
#[derive(Clone, Debug)]
pub struct Recipient {
    pub id: RecipientId,
    /// Externally-exposed opaque id (`rcp_…`).
    pub public_id: String,
    /// Platform-level target identifier (user id or group id on the chat platform).
    pub target_id: String,
    pub kind: RecipientKind,
    pub description: String,
    /// Owning user's external subject id. Direct recipients only.
    pub owner_subject_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a recipient.
#[derive(Clone, Debug)]
pub struct CreateRecipientParams {
    pub public_id: String,
    pub target_id: String,
    pub kind: RecipientKind,
    pub description: String,
    pub owner_subject_id: Option<String>,
}
