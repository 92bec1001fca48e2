//! Distributed lock service.
//!
//! At most one holder per key at any instant, with one accepted exception:
//! once a lock outlives its TTL the backend forgets it and a second acquirer
//! can succeed while the first is still running. Holders must finish well
//! within the TTL. There is no fencing token.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use booking_core::config::lock::LockConfig;
use booking_core::error::AppError;
use booking_core::result::AppResult;
use booking_core::traits::LockBackend;

use crate::backoff::BackoffPolicy;
use crate::token::LockToken;

/// Key-scoped mutual exclusion over a shared [`LockBackend`].
#[derive(Debug, Clone)]
pub struct DistributedLock {
    /// Shared lock store.
    backend: Arc<dyn LockBackend>,
    /// Prefix prepended to every resource key in the backend.
    key_prefix: String,
}

impl DistributedLock {
    /// Create a lock service over `backend`.
    pub fn new(backend: Arc<dyn LockBackend>, key_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            key_prefix: key_prefix.into(),
        }
    }

    /// Create a lock service using the configured key prefix.
    pub fn from_config(backend: Arc<dyn LockBackend>, config: &LockConfig) -> Self {
        Self::new(backend, config.key_prefix.clone())
    }

    /// A view of this lock whose keys live under `namespace`.
    pub fn scoped(&self, namespace: &str) -> ScopedLock {
        ScopedLock {
            inner: self.clone(),
            namespace: format!("{namespace}:"),
        }
    }

    fn full_key(&self, resource_key: &str) -> String {
        format!("{}{resource_key}", self.key_prefix)
    }

    fn validate(resource_key: &str, ttl: Duration) -> AppResult<()> {
        if resource_key.is_empty() {
            return Err(AppError::validation("Resource key cannot be empty"));
        }
        if ttl.is_zero() {
            return Err(AppError::validation("Lock TTL must be greater than zero"));
        }
        Ok(())
    }

    /// Take the lock on `resource_key` if nobody holds it.
    ///
    /// Returns `None` when the key is already held; nothing is changed in
    /// that case.
    pub async fn try_acquire(
        &self,
        resource_key: &str,
        ttl: Duration,
    ) -> AppResult<Option<LockToken>> {
        self.try_acquire_with_value(resource_key, ttl, None).await
    }

    /// Like [`try_acquire`](Self::try_acquire) with a caller-chosen owner
    /// value instead of a random one.
    pub async fn try_acquire_with_value(
        &self,
        resource_key: &str,
        ttl: Duration,
        value: Option<&str>,
    ) -> AppResult<Option<LockToken>> {
        Self::validate(resource_key, ttl)?;

        let lock_value = match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => Uuid::new_v4().simple().to_string(),
        };

        let acquired = self
            .backend
            .set_nx(&self.full_key(resource_key), &lock_value, ttl)
            .await?;

        if !acquired {
            debug!(resource_key, "Resource is already locked");
            return Ok(None);
        }

        info!(
            resource_key,
            ttl_ms = ttl.as_millis() as u64,
            "Lock acquired"
        );
        Ok(Some(LockToken::new(resource_key, lock_value)))
    }

    /// Take the lock on `resource_key`, failing with
    /// [`ErrorKind::LockUnavailable`](booking_core::error::ErrorKind::LockUnavailable)
    /// if it is held.
    pub async fn acquire(&self, resource_key: &str, ttl: Duration) -> AppResult<LockToken> {
        match self.try_acquire(resource_key, ttl).await? {
            Some(token) => Ok(token),
            None => {
                warn!(resource_key, "Failed to acquire lock");
                Err(AppError::lock_unavailable(format!(
                    "Failed to acquire lock for resource {resource_key}"
                )))
            }
        }
    }

    /// Release the lock proven by `token`.
    ///
    /// Deletes the key only if it still stores the token's value, so a lock
    /// that expired and was taken by someone else is left alone. Returns
    /// `false` on mismatch or absence.
    pub async fn release(&self, token: &LockToken) -> AppResult<bool> {
        let released = self
            .backend
            .compare_and_delete(&self.full_key(&token.resource_key), &token.lock_value)
            .await?;

        if released {
            info!(resource_key = %token.resource_key, "Lock released");
        } else {
            warn!(
                resource_key = %token.resource_key,
                "Failed to release lock - value mismatch or lock doesn't exist"
            );
        }

        Ok(released)
    }

    /// Delete the lock on `resource_key` regardless of owner.
    pub async fn force_release(&self, resource_key: &str) -> AppResult<bool> {
        if resource_key.is_empty() {
            return Err(AppError::validation("Resource key cannot be empty"));
        }

        let released = self.backend.delete(&self.full_key(resource_key)).await?;

        if released {
            warn!(resource_key, "Lock forcibly released");
        } else {
            warn!(
                resource_key,
                "Failed to forcibly release lock - lock doesn't exist"
            );
        }

        Ok(released)
    }

    /// Current owner value of `resource_key`, if held.
    pub async fn holder(&self, resource_key: &str) -> AppResult<Option<String>> {
        self.backend.get(&self.full_key(resource_key)).await
    }

    /// Repeatedly call [`try_acquire`](Self::try_acquire) following `policy`.
    ///
    /// After failed attempt `n` waits `policy.delay_for_attempt(n)`; gives up
    /// with `None` once `policy.max_attempts` attempts have failed. Backend
    /// errors count as failed attempts. `cancel` is checked between attempts
    /// only; a wait in progress is not interrupted.
    pub async fn try_acquire_with_backoff(
        &self,
        resource_key: &str,
        ttl: Duration,
        policy: &BackoffPolicy,
        cancel: &CancellationToken,
    ) -> AppResult<Option<LockToken>> {
        Self::validate(resource_key, ttl)?;

        let attempts = policy.max_attempts.max(1);
        for attempt in 0..attempts {
            if attempt > 0 && cancel.is_cancelled() {
                debug!(resource_key, attempt, "Lock acquisition cancelled");
                return Ok(None);
            }

            match self.try_acquire(resource_key, ttl).await {
                Ok(Some(token)) => return Ok(Some(token)),
                Ok(None) => {}
                Err(e) => {
                    warn!(resource_key, attempt, error = %e, "Lock attempt failed");
                }
            }

            if attempt + 1 < attempts {
                let delay = policy.delay_for_attempt(attempt);
                debug!(
                    resource_key,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Lock busy, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }

        info!(resource_key, attempts, "Lock still busy after all attempts");
        Ok(None)
    }

    /// Check that the backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.backend.health_check().await
    }
}

/// A [`DistributedLock`] confined to one key namespace.
///
/// Tokens carry the namespaced resource key, so they can be released
/// through either the scoped or the underlying lock.
#[derive(Debug, Clone)]
pub struct ScopedLock {
    /// Underlying lock service.
    inner: DistributedLock,
    /// Namespace with trailing separator.
    namespace: String,
}

impl ScopedLock {
    /// The resource key as stored in the token.
    pub fn context_key(&self, resource_key: &str) -> String {
        format!("{}{resource_key}", self.namespace)
    }

    /// See [`DistributedLock::try_acquire`].
    pub async fn try_acquire(
        &self,
        resource_key: &str,
        ttl: Duration,
    ) -> AppResult<Option<LockToken>> {
        self.inner
            .try_acquire(&self.context_key(resource_key), ttl)
            .await
    }

    /// See [`DistributedLock::acquire`].
    pub async fn acquire(&self, resource_key: &str, ttl: Duration) -> AppResult<LockToken> {
        self.inner.acquire(&self.context_key(resource_key), ttl).await
    }

    /// See [`DistributedLock::try_acquire_with_backoff`].
    pub async fn try_acquire_with_backoff(
        &self,
        resource_key: &str,
        ttl: Duration,
        policy: &BackoffPolicy,
        cancel: &CancellationToken,
    ) -> AppResult<Option<LockToken>> {
        self.inner
            .try_acquire_with_backoff(&self.context_key(resource_key), ttl, policy, cancel)
            .await
    }

    /// See [`DistributedLock::release`].
    pub async fn release(&self, token: &LockToken) -> AppResult<bool> {
        self.inner.release(token).await
    }

    /// See [`DistributedLock::force_release`].
    pub async fn force_release(&self, resource_key: &str) -> AppResult<bool> {
        self.inner
            .force_release(&self.context_key(resource_key))
            .await
    }
}
