//! User identity resolution.
//!
//! A user row exists for every platform subject that has logged in at
//! least once. Creation is insert-then-re-read: the insert may lose to a
//! concurrent first login, and the re-read decides what the user actually
//! looks like.

use crate::ids::new_user_public_id;
use mailcast_storage::{CreateUserParams, Store, StoreError, User};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Identity resolution errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("User creation could not be confirmed")]
    Creation,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves platform subjects to relay users, creating them on first login.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn Store>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Fetch the user for a platform subject, creating the row on first login.
    pub async fn resolve_or_create(&self, subject_id: &str) -> Result<User, IdentityError> {
        match self.store.get_user_by_subject(subject_id).await {
            Ok(user) => return Ok(user),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let params = CreateUserParams {
            subject_id: subject_id.to_string(),
            public_id: new_user_public_id(),
        };

        match self.store.insert_user(&params).await {
            Ok(()) => info!("created user for subject {}", subject_id),
            // Concurrent first login; the re-read below resolves the winner.
            Err(StoreError::AlreadyExists) => {}
            Err(e) => return Err(e.into()),
        }

        match self.store.get_user_by_subject(subject_id).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound) => Err(IdentityError::Creation),
            Err(e) => Err(e.into()),
        }
    }
}
