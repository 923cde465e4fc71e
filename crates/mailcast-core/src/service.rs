//! Relay service facade.
//!
//! Wires the identity provider, registry, address lifecycle, pipeline and
//! gateway together and exposes the platform-facing operations: login,
//! group-join observation and envelope handling.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::address::AddressLifecycle;
use crate::dispatch::{DispatchGateway, DispatchResult, SideChannel};
use crate::identity::{IdentityError, IdentityResolver};
use crate::identity_provider::{IdentityProvider, IdentityProviderError};
use crate::ingest::{Envelope, IngestOutcome, MailPipeline};
use crate::messenger::Messenger;
use crate::registry::{RecipientRegistry, RegistryError};
use crate::token::{TokenApi, TokenManager};
use mailcast_storage::{Recipient, RecipientKind, Store, StoreError, User};

/// Service-level errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    IdentityProvider(#[from] IdentityProviderError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors building a service from configuration
#[cfg(feature = "http-client")]
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Messenger(#[from] crate::messenger::MessengerError),

    #[error(transparent)]
    IdentityProvider(#[from] IdentityProviderError),

    #[error(transparent)]
    Token(#[from] crate::token::TokenError),
}

/// An authenticated user together with the recipients available to them.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub recipients: Vec<Recipient>,
}

/// The relay service.
pub struct RelayService {
    identity_provider: Arc<dyn IdentityProvider>,
    messenger: Arc<dyn Messenger>,
    store: Arc<dyn Store>,
    pub identity: IdentityResolver,
    pub registry: Arc<RecipientRegistry>,
    pub addresses: AddressLifecycle,
    pub pipeline: MailPipeline,
    pub gateway: DispatchGateway,
}

impl RelayService {
    pub fn new(
        store: Arc<dyn Store>,
        identity_provider: Arc<dyn IdentityProvider>,
        messenger: Arc<dyn Messenger>,
        token_api: Arc<dyn TokenApi>,
        side_channel: Option<SideChannel>,
    ) -> Self {
        let identity = IdentityResolver::new(Arc::clone(&store));
        let registry = Arc::new(RecipientRegistry::new(
            Arc::clone(&store),
            Arc::clone(&messenger),
        ));
        let tokens = Arc::new(TokenManager::new(token_api));
        let addresses =
            AddressLifecycle::new(Arc::clone(&store), Arc::clone(&registry), tokens);
        let pipeline = MailPipeline::new(Arc::clone(&store));
        let gateway = DispatchGateway::new(Arc::clone(&messenger), side_channel);

        Self {
            identity_provider,
            messenger,
            store,
            identity,
            registry,
            addresses,
            pipeline,
            gateway,
        }
    }

    /// Build a service with HTTP clients for every external surface.
    ///
    /// The side channel is active only when both a topic is configured
    /// and an event bus is supplied.
    #[cfg(feature = "http-client")]
    pub fn from_config(
        config: &crate::config::RelayConfig,
        store: Arc<dyn Store>,
        event_bus: Option<Arc<dyn mailcast_events::EventBus>>,
    ) -> Result<Self, BuildError> {
        let messenger: Arc<dyn Messenger> =
            Arc::new(crate::messenger::HttpMessenger::new(&config.messaging)?);
        let identity_provider: Arc<dyn IdentityProvider> =
            Arc::new(crate::identity_provider::HttpIdentityProvider::new(&config.identity)?);
        let token_api: Arc<dyn TokenApi> =
            Arc::new(crate::token::HttpTokenApi::new(&config.token_api)?);

        let side_channel = match (&config.side_channel, event_bus) {
            (Some(sc), Some(bus)) => Some(SideChannel {
                bus,
                topic: sc.topic.clone(),
            }),
            _ => None,
        };

        Ok(Self::new(
            store,
            identity_provider,
            messenger,
            token_api,
            side_channel,
        ))
    }

    /// Log a user in from an opaque login artifact.
    ///
    /// First login creates the user row and registers their direct
    /// recipient, described by their display name when the platform
    /// exposes one. The session carries the recipients currently
    /// available to the user.
    pub async fn login(&self, artifact: &str) -> Result<Session, ServiceError> {
        let profile = self.identity_provider.exchange(artifact).await?;
        let user = self.identity.resolve_or_create(&profile.subject_id).await?;

        let description = profile
            .display_name
            .as_deref()
            .unwrap_or(&profile.subject_id);
        self.registry
            .register_recipient(
                &profile.subject_id,
                RecipientKind::Direct,
                description,
                Some(&profile.subject_id),
            )
            .await?;

        let recipients = self.registry.list_available(&user).await?;
        Ok(Session { user, recipients })
    }

    /// Record a group the bot was added to as a group recipient.
    ///
    /// The group name comes from a best-effort summary probe; when the
    /// platform will not answer, the target id stands in as the
    /// description.
    pub async fn observe_group_join(
        &self,
        group_target_id: &str,
    ) -> Result<Recipient, ServiceError> {
        let description = match self.messenger.get_group_summary(group_target_id).await {
            Ok(summary) => summary.name,
            Err(e) => {
                warn!("group summary for {} failed: {}", group_target_id, e);
                group_target_id.to_string()
            }
        };

        let recipient = self
            .registry
            .register_recipient(group_target_id, RecipientKind::Group, &description, None)
            .await?;
        Ok(recipient)
    }

    /// Resolve a user from their externally-exposed public id.
    pub async fn resolve_user(&self, public_id: &str) -> Result<User, ServiceError> {
        Ok(self.store.get_user_by_public_id(public_id).await?)
    }

    /// Ingest one envelope and dispatch it when it resolves.
    pub async fn handle_envelope(
        &self,
        envelope: &Envelope,
    ) -> (IngestOutcome, Option<DispatchResult>) {
        match self.pipeline.ingest(envelope).await {
            IngestOutcome::Dispatch(request) => {
                let result = self.gateway.dispatch(&request).await;
                (IngestOutcome::Dispatch(request), Some(result))
            }
            rejected => (rejected, None),
        }
    }
}
