//! Address lifecycle.
//!
//! Addresses bind a mail alias to a recipient on behalf of a user. The
//! alias is stored as a bare local part: the domain half of whatever the
//! user typed is validated and then dropped, and lookups are
//! case-insensitive.

use crate::ids::new_address_public_id;
use crate::metrics::{record_address_deleted, record_address_registered};
use crate::registry::{RecipientRegistry, RegistryError};
use crate::token::{TokenError, TokenManager};
use mailcast_storage::{Address, AddressStatus, CreateAddressParams, Store, StoreError, User};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Domain appended when the user submits a bare local part.
const DEFAULT_DOMAIN: &str = "mailcast.local";

/// Minimum alias length in characters.
const MIN_ALIAS_LEN: usize = 4;

/// Address lifecycle errors
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("{0}")]
    Validation(String),

    #[error("Address alias is already registered")]
    DuplicateAddress,

    #[error("Recipient is not available to this user")]
    RecipientUnavailable,

    #[error("Address creation could not be confirmed")]
    Creation,

    #[error("Address not found")]
    NotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Manages the address rows binding aliases to recipients.
#[derive(Clone)]
pub struct AddressLifecycle {
    store: Arc<dyn Store>,
    registry: Arc<RecipientRegistry>,
    tokens: Arc<TokenManager>,
}

impl AddressLifecycle {
    pub fn new(
        store: Arc<dyn Store>,
        registry: Arc<RecipientRegistry>,
        tokens: Arc<TokenManager>,
    ) -> Self {
        Self {
            store,
            registry,
            tokens,
        }
    }

    /// Register a new address for `user`, bound to the recipient with the
    /// given public id. The address starts enabled and carries a freshly
    /// issued channel token.
    pub async fn register(
        &self,
        user: &User,
        email_input: &str,
        recipient_public_id: &str,
    ) -> Result<Address, AddressError> {
        let local_part = normalize_alias(email_input)?;

        if self.is_duplicate(&local_part).await? {
            return Err(AddressError::DuplicateAddress);
        }

        let recipient = self
            .registry
            .list_available(user)
            .await?
            .into_iter()
            .find(|r| r.public_id == recipient_public_id)
            .ok_or(AddressError::RecipientUnavailable)?;

        let channel_token = self.tokens.issue().await?;

        let params = CreateAddressParams {
            public_id: new_address_public_id(),
            local_part: local_part.clone(),
            user_id: user.id.clone(),
            recipient_id: recipient.id.clone(),
            status: AddressStatus::Enabled,
            channel_token: Some(channel_token),
        };

        match self.store.insert_address(&params).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists) => {
                warn!(
                    "alias {} was registered concurrently; issued token is discarded",
                    local_part
                );
                return Err(AddressError::DuplicateAddress);
            }
            Err(e) => return Err(e.into()),
        }

        let address = match self.store.get_address_by_local_part(&local_part).await {
            Ok(address) => address,
            Err(StoreError::NotFound) => return Err(AddressError::Creation),
            Err(e) => return Err(e.into()),
        };

        record_address_registered();
        Ok(address)
    }

    /// Enable an address. Enabling an already-enabled address is a no-op.
    pub async fn enable(&self, public_id: &str) -> Result<(), AddressError> {
        self.store
            .set_address_status(public_id, AddressStatus::Enabled)
            .await?;
        Ok(())
    }

    /// Disable an address. Disabling an already-disabled address is a no-op.
    pub async fn disable(&self, public_id: &str) -> Result<(), AddressError> {
        self.store
            .set_address_status(public_id, AddressStatus::Disabled)
            .await?;
        Ok(())
    }

    /// Delete an address, revoking its channel token first.
    ///
    /// Revocation is best-effort: a revoke failure is logged and the row is
    /// deleted anyway, so the alias is never left claimable-but-dead.
    pub async fn unregister(&self, public_id: &str) -> Result<(), AddressError> {
        let address = match self.store.get_address_by_public_id(public_id).await {
            Ok(address) => address,
            Err(StoreError::NotFound) => return Err(AddressError::NotFound),
            Err(e) => return Err(e.into()),
        };

        if let Some(token) = &address.channel_token {
            if let Err(e) = self.tokens.revoke(token).await {
                warn!("revoking token for address {} failed: {}", public_id, e);
            }
        }

        // The row may have raced away while the revoke call was in flight.
        match self.store.get_address_by_public_id(public_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound) => return Err(AddressError::NotFound),
            Err(e) => return Err(e.into()),
        }

        self.store.delete_address(public_id).await?;
        record_address_deleted();
        Ok(())
    }

    /// List all addresses owned by a user.
    pub async fn list(&self, user: &User) -> Result<Vec<Address>, AddressError> {
        Ok(self.store.list_addresses_by_user(&user.id).await?)
    }

    /// Probe whether an alias is already taken. Called before the channel
    /// token round-trip so a doomed registration never acquires a token.
    pub async fn is_duplicate(&self, local_part: &str) -> Result<bool, AddressError> {
        match self.store.get_address_by_local_part(local_part).await {
            Ok(_) => Ok(true),
            // Two rows for one alias still means the alias is taken.
            Err(StoreError::Duplicate) => Ok(true),
            Err(StoreError::NotFound) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Normalize user input into the stored alias form: the lowercased local
/// part of a syntactically valid address.
fn normalize_alias(email_input: &str) -> Result<String, AddressError> {
    let trimmed = email_input.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Validation(
            "Address must not be empty".to_string(),
        ));
    }

    // A bare local part is allowed; only the local part is stored anyway.
    let candidate = if trimmed.contains('@') {
        trimmed.to_string()
    } else {
        format!("{}@{}", trimmed, DEFAULT_DOMAIN)
    };

    let parsed = crate::ingest::first_address(&candidate).ok_or_else(|| {
        AddressError::Validation("Address is not a valid email address".to_string())
    })?;

    let local_part = match parsed.split_once('@') {
        Some((local, _domain)) => local.to_lowercase(),
        None => parsed.to_lowercase(),
    };

    if local_part.chars().count() < MIN_ALIAS_LEN {
        return Err(AddressError::Validation(format!(
            "Alias must be at least {} characters",
            MIN_ALIAS_LEN
        )));
    }

    Ok(local_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_alias_strips_domain_and_lowercases() {
        assert_eq!(normalize_alias("ABCD@Example.com").unwrap(), "abcd");
    }

    #[test]
    fn test_normalize_alias_accepts_bare_local_part() {
        assert_eq!(normalize_alias("inbox1").unwrap(), "inbox1");
    }

    #[test]
    fn test_normalize_alias_trims_whitespace() {
        assert_eq!(normalize_alias("  team-mail@example.com  ").unwrap(), "team-mail");
    }

    #[test]
    fn test_normalize_alias_rejects_empty() {
        assert!(matches!(
            normalize_alias("   "),
            Err(AddressError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_alias_rejects_short() {
        assert!(matches!(
            normalize_alias("abc@example.com"),
            Err(AddressError::Validation(_))
        ));
    }
}
