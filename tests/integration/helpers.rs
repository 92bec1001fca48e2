//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use booking_core::config::AppConfig;
use booking_core::result::AppResult;
use booking_core::traits::{Clock, EventStore, LockBackend};
use booking_core::types::{SessionId, UserId};
use booking_domain::Session;
use booking_lock::memory::MemoryLockBackend;
use booking_lock::{DistributedLock, keys};
use booking_service::reservation::{
    CancelOutcome, CancelReservation, CreateSession, ReserveOutcome, ReserveSeat,
};
use booking_service::{ReservationService, WorkflowDeps};
use booking_store::{InMemoryEventStore, SessionRepository};

/// Test application context
pub struct TestApp {
    /// The reservation service under test
    pub service: ReservationService,
    /// Unscoped lock over the same backend, for setting up contention
    pub lock: DistributedLock,
    /// Lock backend that records every acquire and release
    pub backend: RecordingBackend,
    /// Event store for direct inspection
    pub store: Arc<InMemoryEventStore>,
}

impl TestApp {
    /// Create a test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with the given configuration
    pub fn with_config(config: AppConfig) -> Self {
        let backend = RecordingBackend::default();
        let lock = DistributedLock::from_config(Arc::new(backend.clone()), &config.lock);
        let store = Arc::new(InMemoryEventStore::new());
        let deps = WorkflowDeps::new(
            lock.scoped(keys::SESSION_NAMESPACE),
            Arc::new(SteppingClock::default()),
            &config.lock.session,
        );
        let service = ReservationService::new(
            SessionRepository::new(store.clone()),
            deps,
            &config.workflow,
        );

        Self {
            service,
            lock,
            backend,
            store,
        }
    }

    /// Create a session with `seats` seats
    pub async fn create_session(&self, seats: u32) -> SessionId {
        let session_id = SessionId::new();
        let created = self
            .service
            .create_session(CreateSession {
                session_id,
                title: "Fearless Concurrency".to_string(),
                seats: i64::from(seats),
                start_time: Utc.with_ymd_and_hms(2026, 11, 2, 14, 0, 0).unwrap(),
            })
            .await
            .expect("Failed to create session");
        assert!(created, "session should be newly created");
        session_id
    }

    /// Reserve a seat for `user_id`
    pub async fn reserve(&self, session_id: SessionId, user_id: UserId) -> AppResult<ReserveOutcome> {
        self.service
            .reserve(ReserveSeat {
                session_id,
                user_id,
            })
            .await
    }

    /// Cancel `user_id`'s reservation or waitlist place
    pub async fn cancel(&self, session_id: SessionId, user_id: UserId) -> AppResult<CancelOutcome> {
        self.service
            .cancel(CancelReservation {
                session_id,
                user_id,
            })
            .await
    }

    /// Current session snapshot
    pub async fn session(&self, session_id: SessionId) -> Session {
        self.service
            .get_session(session_id)
            .await
            .expect("Session should exist")
    }

    /// Event type names in the session stream, oldest first
    pub async fn event_types(&self, session_id: SessionId) -> Vec<&'static str> {
        self.store
            .load(session_id)
            .await
            .expect("Failed to load stream")
            .iter()
            .map(|recorded| recorded.event.event_type())
            .collect()
    }

    /// Backend key of the session lock
    pub fn session_lock_key(&self, session_id: SessionId) -> String {
        format!(
            "{}:{}",
            keys::SESSION_NAMESPACE,
            keys::session_lock(session_id)
        )
    }
}

/// Clock that advances one second per reading
#[derive(Debug, Default)]
pub struct SteppingClock {
    ticks: AtomicI64,
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap() + chrono::Duration::seconds(tick)
    }
}

/// A successful lock operation seen by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockEvent {
    Acquired(String),
    Released(String),
}

/// In-memory lock backend that logs successful acquires and releases in
/// the order the backend applied them
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    inner: MemoryLockBackend,
    log: Arc<Mutex<Vec<LockEvent>>>,
}

impl RecordingBackend {
    /// Everything recorded so far
    pub async fn events(&self) -> Vec<LockEvent> {
        self.log.lock().await.clone()
    }

    /// Panic if any key was acquired again before being released
    pub async fn assert_no_overlapping_holds(&self) {
        let mut held: Vec<String> = Vec::new();
        for event in self.events().await {
            match event {
                LockEvent::Acquired(key) => {
                    assert!(!held.contains(&key), "{key} acquired while already held");
                    held.push(key);
                }
                LockEvent::Released(key) => {
                    assert!(held.contains(&key), "{key} released while not held");
                    held.retain(|k| k != &key);
                }
            }
        }
    }
}

#[async_trait]
impl LockBackend for RecordingBackend {
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let mut log = self.log.lock().await;
        let acquired = self.inner.set_nx(key, value, ttl).await?;
        if acquired {
            log.push(LockEvent::Acquired(key.to_string()));
        }
        Ok(acquired)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let mut log = self.log.lock().await;
        let released = self.inner.compare_and_delete(key, expected).await?;
        if released {
            log.push(LockEvent::Released(key.to_string()));
        }
        Ok(released)
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let mut log = self.log.lock().await;
        let released = self.inner.delete(key).await?;
        if released {
            log.push(LockEvent::Released(key.to_string()));
        }
        Ok(released)
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
