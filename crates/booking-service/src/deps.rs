//! Collaborators shared by every command handler.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use booking_core::config::lock::SessionLockConfig;
use booking_core::traits::Clock;
use booking_lock::{BackoffPolicy, LockToken, ScopedLock};

/// Lock service, clock, and session-lock policy used by the handlers.
#[derive(Debug, Clone)]
pub struct WorkflowDeps {
    /// Lock service scoped to the session namespace.
    pub lock: ScopedLock,
    /// Stamps waitlist entries.
    pub clock: Arc<dyn Clock>,
    /// TTL of the session lock.
    pub lock_ttl: Duration,
    /// Retry schedule for the session lock.
    pub backoff: BackoffPolicy,
    /// Stops lock retries between attempts, e.g. on shutdown.
    pub cancel: CancellationToken,
}

impl WorkflowDeps {
    /// Build from the session lock configuration.
    pub fn new(lock: ScopedLock, clock: Arc<dyn Clock>, config: &SessionLockConfig) -> Self {
        Self {
            lock,
            clock,
            lock_ttl: config.ttl(),
            backoff: BackoffPolicy::from_config(config),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the cancellation signal.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Release `held`, logging instead of failing.
    ///
    /// Warns when the lock was held past its TTL: from that point another
    /// worker may have acquired the same key.
    pub async fn release(&self, held: &HeldLock) {
        if let Some(held_for) = held.held_for() {
            if held_for > self.lock_ttl {
                warn!(
                    resource_key = %held.token.resource_key,
                    held_ms = held_for.as_millis() as u64,
                    ttl_ms = self.lock_ttl.as_millis() as u64,
                    "Lock held past its TTL; another holder may have overlapped"
                );
            }
        }

        if let Err(e) = self.lock.release(&held.token).await {
            warn!(
                resource_key = %held.token.resource_key,
                error = %e,
                "Failed to release lock; it will expire on its own"
            );
        }
    }
}

/// A lock token together with when this process acquired it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldLock {
    /// Ownership proof.
    pub token: LockToken,
    /// `None` for tokens received from elsewhere.
    pub acquired_at: Option<Instant>,
}

impl HeldLock {
    /// A lock acquired just now.
    pub fn acquired(token: LockToken) -> Self {
        Self {
            token,
            acquired_at: Some(Instant::now()),
        }
    }

    /// A lock handed over without its acquisition time.
    pub fn transferred(token: LockToken) -> Self {
        Self {
            token,
            acquired_at: None,
        }
    }

    /// How long the lock has been held, if known.
    pub fn held_for(&self) -> Option<Duration> {
        self.acquired_at.map(|at| at.elapsed())
    }
}
