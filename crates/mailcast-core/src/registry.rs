//! Recipient registry.
//!
//! Recipients are the chat targets mail can be relayed to. The catalog is
//! append-only: targets are registered when first seen and never deleted,
//! so dangling address references cannot occur.

use crate::ids::new_recipient_public_id;
use crate::messenger::Messenger;
use futures::future::join_all;
use mailcast_storage::{CreateRecipientParams, Recipient, RecipientKind, Store, StoreError, User};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Descriptions longer than this are silently truncated.
const MAX_DESCRIPTION_LEN: usize = 100;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Recipient creation could not be confirmed")]
    Creation,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Append-only catalog of chat targets mail can be relayed to.
#[derive(Clone)]
pub struct RecipientRegistry {
    store: Arc<dyn Store>,
    messenger: Arc<dyn Messenger>,
}

impl RecipientRegistry {
    pub fn new(store: Arc<dyn Store>, messenger: Arc<dyn Messenger>) -> Self {
        Self { store, messenger }
    }

    /// Recipients a user may bind addresses to: the ones they own plus
    /// every group recipient the platform still reports them a member of.
    ///
    /// Membership probes are best-effort. A probe failure excludes that
    /// group from the result rather than failing the whole listing.
    pub async fn list_available(&self, user: &User) -> Result<Vec<Recipient>, RegistryError> {
        let mut available = self
            .store
            .list_recipients_by_owner(&user.subject_id)
            .await?;

        let groups = self.store.list_group_recipients().await?;
        let probes = groups.into_iter().map(|group| {
            let messenger = Arc::clone(&self.messenger);
            let subject_id = user.subject_id.clone();
            async move {
                match messenger
                    .check_membership(&group.target_id, &subject_id)
                    .await
                {
                    Ok(true) => Some(group),
                    Ok(false) => None,
                    Err(e) => {
                        warn!(
                            "membership probe for group {} failed: {}",
                            group.target_id, e
                        );
                        None
                    }
                }
            }
        });

        available.extend(join_all(probes).await.into_iter().flatten());
        Ok(available)
    }

    /// Register a chat target as a recipient. Registering a target that is
    /// already known returns the existing row untouched.
    pub async fn register_recipient(
        &self,
        target_id: &str,
        kind: RecipientKind,
        description: &str,
        owner_subject_id: Option<&str>,
    ) -> Result<Recipient, RegistryError> {
        match self.store.get_recipient_by_target(target_id).await {
            Ok(recipient) => return Ok(recipient),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let params = CreateRecipientParams {
            public_id: new_recipient_public_id(),
            target_id: target_id.to_string(),
            kind,
            description: truncate_description(description),
            owner_subject_id: owner_subject_id.map(str::to_string),
        };

        match self.store.insert_recipient(&params).await {
            Ok(()) => {}
            // Concurrent registration of the same target; the re-read below
            // resolves the winner.
            Err(StoreError::AlreadyExists) => {}
            Err(e) => return Err(e.into()),
        }

        match self.store.get_recipient_by_target(target_id).await {
            Ok(recipient) => Ok(recipient),
            Err(StoreError::NotFound) => Err(RegistryError::Creation),
            Err(e) => Err(e.into()),
        }
    }
}

fn truncate_description(description: &str) -> String {
    description.chars().take(MAX_DESCRIPTION_LEN).collect()
}
