//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait `mailcast-core` depends on.
///
/// Unique-key lookups return exactly zero or one row: zero maps to
/// `StoreError::NotFound`, more than one to `StoreError::Duplicate`.
/// Inserts are single-statement and safe to retry; callers confirm the
/// outcome with a subsequent read rather than trusting the write.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Users ──────────────────────────────────────────

    /// Insert a new user. Fails with `AlreadyExists` if the external
    /// subject id or public id is already taken.
    async fn insert_user(&self, params: &CreateUserParams) -> Result<(), StoreError>;

    /// Get user by external identity-provider subject id.
    async fn get_user_by_subject(&self, subject_id: &str) -> Result<User, StoreError>;

    /// Get user by externally-exposed public id.
    async fn get_user_by_public_id(&self, public_id: &str) -> Result<User, StoreError>;

    // ───────────────────────────────────── Recipients ─────────────────────────────────────

    /// Insert a new recipient. Fails with `AlreadyExists` if the platform
    /// target id is already registered.
    async fn insert_recipient(&self, params: &CreateRecipientParams) -> Result<(), StoreError>;

    /// Get recipient by platform-level target id.
    async fn get_recipient_by_target(&self, target_id: &str) -> Result<Recipient, StoreError>;

    /// Get recipient by primary key.
    async fn get_recipient_by_id(&self, id: &RecipientId) -> Result<Recipient, StoreError>;

    /// List direct recipients owned by the given external subject id.
    async fn list_recipients_by_owner(
        &self,
        owner_subject_id: &str,
    ) -> Result<Vec<Recipient>, StoreError>;

    /// List all group recipients ever observed.
    async fn list_group_recipients(&self) -> Result<Vec<Recipient>, StoreError>;

    // ───────────────────────────────────── Addresses ──────────────────────────────────────

    /// Insert a new address. Fails with `AlreadyExists` if the normalized
    /// local part is already taken (case-insensitive, global).
    async fn insert_address(&self, params: &CreateAddressParams) -> Result<(), StoreError>;

    /// Get address by normalized local part, any status.
    async fn get_address_by_local_part(&self, local_part: &str) -> Result<Address, StoreError>;

    /// Get address by normalized local part, enabled rows only.
    async fn get_enabled_address_by_local_part(
        &self,
        local_part: &str,
    ) -> Result<Address, StoreError>;

    /// Get address by externally-exposed public id.
    async fn get_address_by_public_id(&self, public_id: &str) -> Result<Address, StoreError>;

    /// List all addresses owned by a user, any status.
    async fn list_addresses_by_user(&self, user_id: &UserId) -> Result<Vec<Address>, StoreError>;

    /// Conditionally set address status. No-op (not an error) when the row
    /// is already in the target status or does not exist.
    async fn set_address_status(
        &self,
        public_id: &str,
        status: AddressStatus,
    ) -> Result<(), StoreError>;

    /// Hard-delete an address. No-op (not an error) when the row is
    /// already gone; callers detect that via a preceding read.
    async fn delete_address(&self, public_id: &str) -> Result<(), StoreError>;
}
