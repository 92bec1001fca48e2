//! Lock backend trait for the distributed mutual-exclusion primitive.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Shared key/value store that the distributed lock is built on.
///
/// Keys are passed fully prefixed. Both [`set_nx`](Self::set_nx) and
/// [`compare_and_delete`](Self::compare_and_delete) must be atomic with
/// respect to every other client of the same store: lock correctness
/// depends on it.
#[async_trait]
pub trait LockBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Set `key` to `value` with automatic expiry after `ttl`, only if the
    /// key is currently unset (or expired).
    ///
    /// Returns `true` if the value was set, `false` if the key is held.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Delete `key` only if its stored value equals `expected`.
    ///
    /// Returns `true` if the key was deleted.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool>;

    /// Unconditionally delete `key`. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> AppResult<bool>;

    /// Read the current (unexpired) value of `key`.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
