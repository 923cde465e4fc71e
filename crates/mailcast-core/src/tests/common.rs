//! Shared test fixtures.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::dispatch::SideChannel;
use crate::identity_provider::{IdentityProfile, IdentityProvider, IdentityProviderError};
use crate::messenger::{GroupSummary, Messenger, MessengerError};
use crate::service::RelayService;
use crate::token::{TokenApi, TokenError};
use mailcast_events::{EventBus, EventBusError, EventStream, NotificationEvent};
use mailcast_events_memory::MemoryEventBus;
use mailcast_storage::{
    Address, AddressId, AddressStatus, CreateUserParams, Recipient, RecipientId, RecipientKind,
    Store, User, UserId,
};
use mailcast_store_memory::MemoryStore;

pub const TEST_TOPIC: &str = "mailcast/notify";

/// Messenger fake recording pushes and answering probes from canned data.
#[derive(Default)]
pub struct FakeMessenger {
    sent: Mutex<Vec<(String, String)>>,
    memberships: Mutex<HashSet<(String, String)>>,
    group_names: Mutex<HashMap<String, String>>,
    pub fail_sends: AtomicBool,
    pub fail_probes: AtomicBool,
}

impl FakeMessenger {
    pub fn add_member(&self, group: &str, subject: &str) {
        self.memberships
            .lock()
            .unwrap()
            .insert((group.to_string(), subject.to_string()));
    }

    pub fn set_group_name(&self, group: &str, name: &str) {
        self.group_names
            .lock()
            .unwrap()
            .insert(group.to_string(), name.to_string());
    }

    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send(&self, target_id: &str, text: &str) -> Result<(), MessengerError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MessengerError::SendFailed("forced failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((target_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn get_group_summary(&self, target_id: &str) -> Result<GroupSummary, MessengerError> {
        match self.group_names.lock().unwrap().get(target_id) {
            Some(name) => Ok(GroupSummary {
                target_id: target_id.to_string(),
                name: name.clone(),
            }),
            None => Err(MessengerError::UnexpectedResponse(
                "no summary".to_string(),
            )),
        }
    }

    async fn check_membership(
        &self,
        target_id: &str,
        subject_id: &str,
    ) -> Result<bool, MessengerError> {
        if self.fail_probes.load(Ordering::SeqCst) {
            return Err(MessengerError::RequestFailed("forced failure".to_string()));
        }
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .contains(&(target_id.to_string(), subject_id.to_string())))
    }
}

/// Token API fake issuing `tok-1`, `tok-2`, ... and recording revocations.
#[derive(Default)]
pub struct FakeTokenApi {
    counter: AtomicUsize,
    revoked: Mutex<Vec<String>>,
    pub fail_issue: AtomicBool,
    pub fail_revoke: AtomicBool,
}

impl FakeTokenApi {
    pub fn issued_count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn revoked_tokens(&self) -> Vec<String> {
        self.revoked.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenApi for FakeTokenApi {
    async fn issue(&self) -> Result<String, TokenError> {
        if self.fail_issue.load(Ordering::SeqCst) {
            return Err(TokenError::IssueFailed("forced failure".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("tok-{}", n))
    }

    async fn revoke(&self, token: &str) -> Result<bool, TokenError> {
        if self.fail_revoke.load(Ordering::SeqCst) {
            return Err(TokenError::RevokeFailed("forced failure".to_string()));
        }
        let mut revoked = self.revoked.lock().unwrap();
        if revoked.contains(&token.to_string()) {
            return Ok(false);
        }
        revoked.push(token.to_string());
        Ok(true)
    }

    async fn status(&self, token: &str) -> Result<bool, TokenError> {
        Ok(!self.revoked.lock().unwrap().contains(&token.to_string()))
    }
}

/// Identity provider fake mapping artifacts to canned profiles.
#[derive(Default)]
pub struct FakeIdentityProvider {
    profiles: Mutex<HashMap<String, IdentityProfile>>,
}

impl FakeIdentityProvider {
    pub fn add_profile(&self, artifact: &str, subject_id: &str, display_name: Option<&str>) {
        self.profiles.lock().unwrap().insert(
            artifact.to_string(),
            IdentityProfile {
                subject_id: subject_id.to_string(),
                display_name: display_name.map(str::to_string),
            },
        );
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn exchange(&self, artifact: &str) -> Result<IdentityProfile, IdentityProviderError> {
        self.profiles
            .lock()
            .unwrap()
            .get(artifact)
            .cloned()
            .ok_or_else(|| {
                IdentityProviderError::ExchangeFailed("unknown artifact".to_string())
            })
    }
}

/// Event bus that refuses every call.
pub struct FailingEventBus;

#[async_trait]
impl EventBus for FailingEventBus {
    async fn publish(&self, _topic: &str, _event: NotificationEvent) -> Result<(), EventBusError> {
        Err(EventBusError::Backend("forced failure".to_string()))
    }

    async fn subscribe(&self, _topic: &str) -> Result<EventStream, EventBusError> {
        Err(EventBusError::Backend("forced failure".to_string()))
    }
}

/// Everything a service test needs to reach into.
pub struct TestService {
    pub service: RelayService,
    pub store: Arc<MemoryStore>,
    pub messenger: Arc<FakeMessenger>,
    pub tokens: Arc<FakeTokenApi>,
    pub identity_provider: Arc<FakeIdentityProvider>,
    pub events: Arc<MemoryEventBus>,
}

/// Relay service over the in-memory backends, side channel active on
/// [`TEST_TOPIC`].
pub fn create_test_service() -> TestService {
    let store = Arc::new(MemoryStore::new());
    let messenger = Arc::new(FakeMessenger::default());
    let tokens = Arc::new(FakeTokenApi::default());
    let identity_provider = Arc::new(FakeIdentityProvider::default());
    let events = Arc::new(MemoryEventBus::new());

    let side_channel = Some(SideChannel {
        bus: events.clone(),
        topic: TEST_TOPIC.to_string(),
    });

    let service = RelayService::new(
        store.clone(),
        identity_provider.clone(),
        messenger.clone(),
        tokens.clone(),
        side_channel,
    );

    TestService {
        service,
        store,
        messenger,
        tokens,
        identity_provider,
        events,
    }
}

/// Insert a user row directly and return it.
pub async fn create_test_user(store: &MemoryStore, subject_id: &str) -> User {
    store
        .insert_user(&CreateUserParams {
            subject_id: subject_id.to_string(),
            public_id: crate::ids::new_user_public_id(),
        })
        .await
        .unwrap();
    store.get_user_by_subject(subject_id).await.unwrap()
}

/// Log a subject in, give them a direct recipient, and bind `alias` to it.
pub async fn register_test_address(ctx: &TestService, subject_id: &str, alias: &str) -> Address {
    let user = ctx
        .service
        .identity
        .resolve_or_create(subject_id)
        .await
        .unwrap();
    let recipient = ctx
        .service
        .registry
        .register_recipient(subject_id, RecipientKind::Direct, subject_id, Some(subject_id))
        .await
        .unwrap();
    ctx.service
        .addresses
        .register(&user, alias, &recipient.public_id)
        .await
        .unwrap()
}

/// Fabricate a stored user row without touching a store.
pub fn fabricate_user(subject_id: &str) -> User {
    let now = Utc::now();
    User {
        id: UserId(Uuid::new_v4()),
        subject_id: subject_id.to_string(),
        public_id: crate::ids::new_user_public_id(),
        created_at: now,
        updated_at: now,
    }
}

/// Fabricate a stored address row bound to `recipient`.
pub fn fabricate_address(local_part: &str, recipient: &Recipient) -> Address {
    let now = Utc::now();
    Address {
        id: AddressId(Uuid::new_v4()),
        public_id: crate::ids::new_address_public_id(),
        local_part: local_part.to_string(),
        user_id: UserId(Uuid::new_v4()),
        recipient_id: recipient.id.clone(),
        status: AddressStatus::Enabled,
        channel_token: Some("tok-1".to_string()),
        created_at: now,
        updated_at: now,
    }
}

/// Fabricate a stored recipient row without touching a store.
pub fn fabricate_recipient(target_id: &str, kind: RecipientKind) -> Recipient {
    let now = Utc::now();
    Recipient {
        id: RecipientId(Uuid::new_v4()),
        public_id: crate::ids::new_recipient_public_id(),
        target_id: target_id.to_string(),
        kind,
        description: target_id.to_string(),
        owner_subject_id: match kind {
            RecipientKind::Direct => Some(target_id.to_string()),
            RecipientKind::Group => None,
        },
        created_at: now,
        updated_at: now,
    }
}
