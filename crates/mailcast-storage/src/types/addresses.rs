//! Address types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::ids::{AddressId, RecipientId, UserId};

/// Address status. Only two states; deletion removes the row entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressStatus {
    Disabled,
    Enabled,
}

/// Error type for parsing AddressStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAddressStatusError(pub String);

impl std::fmt::Display for ParseAddressStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid address status: {}", self.0)
    }
}

impl std::error::Error for ParseAddressStatusError {}

impl FromStr for AddressStatus {
    type Err = ParseAddressStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(AddressStatus::Disabled),
            "enabled" => Ok(AddressStatus::Enabled),
            _ => Err(ParseAddressStatusError(s.to_string())),
        }
    }
}

impl AddressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressStatus::Disabled => "disabled",
            AddressStatus::Enabled => "enabled",
        }
    }
}

/// Address record.
///
/// An email alias bound to exactly one recipient. The normalized local
/// part (lowercased, domain stripped) is globally unique across all rows.
#[derive(Clone, Debug)]
pub struct Address {
    pub id: AddressId,
    /// Externally-exposed opaque id (`adr_…`).
    pub public_id: String,
    /// Normalized email local part: lowercased, length >= 4.
    pub local_part: String,
    pub user_id: UserId,
    pub recipient_id: RecipientId,
    pub status: AddressStatus,
    /// Push-notification channel token issued at registration.
    pub channel_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating an address.
#[derive(Clone, Debug)]
pub struct CreateAddressParams {
    pub public_id: String,
    pub local_part: String,
    pub user_id: UserId,
    pub recipient_id: RecipientId,
    pub status: AddressStatus,
    pub channel_token: Option<String>,
}
