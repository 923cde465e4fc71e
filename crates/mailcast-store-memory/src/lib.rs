//! In-memory store backend for mailcast.
//!
//! Backs tests and single-process deployments. Rows live in plain vectors
//! behind one `RwLock`, so uniqueness checks across indexes are atomic and
//! lookups follow the same scan semantics a relational backend would have:
//! zero rows is `NotFound`, more than one row for a unique key is
//! `Duplicate`. The guard is never held across an await.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use mailcast_storage::{
    Address, AddressId, AddressStatus, CreateAddressParams, CreateRecipientParams,
    CreateUserParams, Recipient, RecipientId, RecipientKind, Store, StoreError, User, UserId,
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    recipients: Vec<Recipient>,
    addresses: Vec<Address>,
}

/// In-memory [`Store`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

/// Collapse a row scan to the unique-key contract: zero rows is
/// `NotFound`, one row is the result, more than one is `Duplicate`.
fn unique_row<T: Clone>(mut rows: impl Iterator<Item = T>) -> Result<T, StoreError> {
    match (rows.next(), rows.next()) {
        (None, _) => Err(StoreError::NotFound),
        (Some(row), None) => Ok(row),
        (Some(_), Some(_)) => Err(StoreError::Duplicate),
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, params: &CreateUserParams) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner
            .users
            .iter()
            .any(|u| u.subject_id == params.subject_id || u.public_id == params.public_id)
        {
            return Err(StoreError::AlreadyExists);
        }
        let now = Utc::now();
        inner.users.push(User {
            id: UserId(Uuid::new_v4()),
            subject_id: params.subject_id.clone(),
            public_id: params.public_id.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn get_user_by_subject(&self, subject_id: &str) -> Result<User, StoreError> {
        let inner = self.read()?;
        unique_row(
            inner
                .users
                .iter()
                .filter(|u| u.subject_id == subject_id)
                .cloned(),
        )
    }

    async fn get_user_by_public_id(&self, public_id: &str) -> Result<User, StoreError> {
        let inner = self.read()?;
        unique_row(
            inner
                .users
                .iter()
                .filter(|u| u.public_id == public_id)
                .cloned(),
        )
    }

    async fn insert_recipient(&self, params: &CreateRecipientParams) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner
            .recipients
            .iter()
            .any(|r| r.target_id == params.target_id || r.public_id == params.public_id)
        {
            return Err(StoreError::AlreadyExists);
        }
        let now = Utc::now();
        inner.recipients.push(Recipient {
            id: RecipientId(Uuid::new_v4()),
            public_id: params.public_id.clone(),
            target_id: params.target_id.clone(),
            kind: params.kind,
            description: params.description.clone(),
            owner_subject_id: params.owner_subject_id.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn get_recipient_by_target(&self, target_id: &str) -> Result<Recipient, StoreError> {
        let inner = self.read()?;
        unique_row(
            inner
                .recipients
                .iter()
                .filter(|r| r.target_id == target_id)
                .cloned(),
        )
    }

    async fn get_recipient_by_id(&self, id: &RecipientId) -> Result<Recipient, StoreError> {
        let inner = self.read()?;
        unique_row(inner.recipients.iter().filter(|r| r.id == *id).cloned())
    }

    async fn list_recipients_by_owner(
        &self,
        owner_subject_id: &str,
    ) -> Result<Vec<Recipient>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .recipients
            .iter()
            .filter(|r| {
                r.kind == RecipientKind::Direct
                    && r.owner_subject_id.as_deref() == Some(owner_subject_id)
            })
            .cloned()
            .collect())
    }

    async fn list_group_recipients(&self) -> Result<Vec<Recipient>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .recipients
            .iter()
            .filter(|r| r.kind == RecipientKind::Group)
            .cloned()
            .collect())
    }

    async fn insert_address(&self, params: &CreateAddressParams) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.addresses.iter().any(|a| {
            a.local_part.eq_ignore_ascii_case(&params.local_part)
                || a.public_id == params.public_id
        }) {
            return Err(StoreError::AlreadyExists);
        }
        let now = Utc::now();
        inner.addresses.push(Address {
            id: AddressId(Uuid::new_v4()),
            public_id: params.public_id.clone(),
            local_part: params.local_part.clone(),
            user_id: params.user_id.clone(),
            recipient_id: params.recipient_id.clone(),
            status: params.status,
            channel_token: params.channel_token.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn get_address_by_local_part(&self, local_part: &str) -> Result<Address, StoreError> {
        let inner = self.read()?;
        unique_row(
            inner
                .addresses
                .iter()
                .filter(|a| a.local_part.eq_ignore_ascii_case(local_part))
                .cloned(),
        )
    }

    async fn get_enabled_address_by_local_part(
        &self,
        local_part: &str,
    ) -> Result<Address, StoreError> {
        let inner = self.read()?;
        unique_row(
            inner
                .addresses
                .iter()
                .filter(|a| {
                    a.status == AddressStatus::Enabled
                        && a.local_part.eq_ignore_ascii_case(local_part)
                })
                .cloned(),
        )
    }

    async fn get_address_by_public_id(&self, public_id: &str) -> Result<Address, StoreError> {
        let inner = self.read()?;
        unique_row(
            inner
                .addresses
                .iter()
                .filter(|a| a.public_id == public_id)
                .cloned(),
        )
    }

    async fn list_addresses_by_user(&self, user_id: &UserId) -> Result<Vec<Address>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .addresses
            .iter()
            .filter(|a| a.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn set_address_status(
        &self,
        public_id: &str,
        status: AddressStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if let Some(row) = inner
            .addresses
            .iter_mut()
            .find(|a| a.public_id == public_id && a.status != status)
        {
            row.status = status;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_address(&self, public_id: &str) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.addresses.retain(|a| a.public_id != public_id);
        Ok(())
    }
}
