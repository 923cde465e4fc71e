//! Token lifecycle tests.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::tests::common::FakeTokenApi;
use crate::token::{TokenError, TokenManager};

#[tokio::test]
async fn test_issue_returns_fresh_token() {
    let api = Arc::new(FakeTokenApi::default());
    let manager = TokenManager::new(api.clone());

    let first = manager.issue().await.unwrap();
    let second = manager.issue().await.unwrap();

    assert_eq!(first, "tok-1");
    assert_eq!(second, "tok-2");
    assert_eq!(api.issued_count(), 2);
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let api = Arc::new(FakeTokenApi::default());
    let manager = TokenManager::new(api.clone());

    let token = manager.issue().await.unwrap();
    manager.revoke(&token).await.unwrap();
    // The second call hits an already-dead token and still succeeds.
    manager.revoke(&token).await.unwrap();

    assert_eq!(api.revoked_tokens(), vec![token]);
}

#[tokio::test]
async fn test_status_reflects_revocation() {
    let api = Arc::new(FakeTokenApi::default());
    let manager = TokenManager::new(api);

    let token = manager.issue().await.unwrap();
    assert!(manager.status(&token).await.unwrap());

    manager.revoke(&token).await.unwrap();
    assert!(!manager.status(&token).await.unwrap());
}

#[tokio::test]
async fn test_revoke_failure_propagates() {
    let api = Arc::new(FakeTokenApi::default());
    api.fail_revoke.store(true, Ordering::SeqCst);
    let manager = TokenManager::new(api);

    let result = manager.revoke("tok-1").await;
    assert!(matches!(result, Err(TokenError::RevokeFailed(_))));
}
