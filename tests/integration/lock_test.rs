//! Integration tests for the distributed lock against the configured backend.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use booking_core::config::lock::LockConfig;
use booking_core::error::ErrorKind;
use booking_core::types::SessionId;
use booking_lock::{BackoffPolicy, DistributedLock, LockBackendManager, LockToken, keys};

async fn lock_service() -> DistributedLock {
    let config = LockConfig::default();
    let backend = LockBackendManager::new(&config)
        .await
        .expect("Failed to init lock backend");
    DistributedLock::from_config(Arc::new(backend), &config)
}

#[tokio::test(start_paused = true)]
async fn test_backoff_exhausts_against_continuously_held_key() {
    let lock = lock_service().await;
    let sessions = lock.scoped(keys::SESSION_NAMESPACE);
    let key = keys::session_lock(SessionId::new());
    let policy = BackoffPolicy::from_config(&LockConfig::default().session);

    sessions
        .try_acquire(&key, Duration::from_secs(30))
        .await
        .unwrap()
        .unwrap();

    let started = tokio::time::Instant::now();
    let token = sessions
        .try_acquire_with_backoff(&key, Duration::from_secs(5), &policy, &CancellationToken::new())
        .await
        .unwrap();

    assert!(token.is_none());
    // 100 + 200 + 400 + 800 ms between five attempts.
    assert_eq!(started.elapsed(), Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_succeeds_after_holder_releases_mid_window() {
    let lock = lock_service().await;
    let sessions = lock.scoped(keys::SESSION_NAMESPACE);
    let key = keys::session_lock(SessionId::new());
    let policy = BackoffPolicy::from_config(&LockConfig::default().session);

    let held = sessions
        .try_acquire(&key, Duration::from_secs(30))
        .await
        .unwrap()
        .unwrap();
    let releaser = {
        let sessions = sessions.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            sessions.release(&held).await.unwrap()
        })
    };

    let started = tokio::time::Instant::now();
    let token = sessions
        .try_acquire_with_backoff(&key, Duration::from_secs(5), &policy, &CancellationToken::new())
        .await
        .unwrap();

    assert!(releaser.await.unwrap());
    assert!(token.is_some());
    // Attempts at 0, 100, 300 and 700 ms; the one at 700 ms finds the key free.
    assert_eq!(started.elapsed(), Duration::from_millis(700));
}

#[tokio::test(start_paused = true)]
async fn test_unreleased_lock_expires_after_ttl() {
    let lock = lock_service().await;
    let ttl = Duration::from_secs(5);

    let crashed = lock.try_acquire("report:42", ttl).await.unwrap().unwrap();
    assert!(lock.try_acquire("report:42", ttl).await.unwrap().is_none());

    tokio::time::advance(ttl + Duration::from_millis(1)).await;

    let next = lock.try_acquire("report:42", ttl).await.unwrap().unwrap();
    assert_ne!(next.lock_value, crashed.lock_value);
    assert!(!lock.release(&crashed).await.unwrap());
    assert!(lock.release(&next).await.unwrap());
}

#[tokio::test]
async fn test_token_survives_a_process_boundary() {
    let lock = lock_service().await;
    let token = lock
        .scoped(keys::SESSION_NAMESPACE)
        .acquire("session:handoff", Duration::from_secs(5))
        .await
        .unwrap();

    let wire = token.to_compact();
    let received: LockToken = wire.parse().unwrap();

    assert_eq!(received, token);
    assert!(lock.release(&received).await.unwrap());
    assert_eq!(lock.holder("Session:session:handoff").await.unwrap(), None);
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let err = LockToken::parse("resourceKey=session:1").unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenFormat);
}

#[tokio::test(start_paused = true)]
async fn test_named_policies() {
    let lock = lock_service().await;
    lock.try_acquire("busy", Duration::from_secs(60))
        .await
        .unwrap()
        .unwrap();

    let aggressive = BackoffPolicy::named("aggressive").unwrap();
    let started = tokio::time::Instant::now();
    let token = lock
        .try_acquire_with_backoff("busy", Duration::from_secs(1), &aggressive, &CancellationToken::new())
        .await
        .unwrap();

    assert!(token.is_none());
    assert_eq!(started.elapsed(), Duration::from_secs(1));
    assert_eq!(
        BackoffPolicy::named("nonsense").unwrap_err().kind,
        ErrorKind::Validation
    );
}
