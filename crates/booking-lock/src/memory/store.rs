//! In-memory lock backend using dashmap.
//!
//! Suitable for single-process deployments and tests. Each operation runs
//! under the shard lock of its key, which makes set-if-absent and
//! compare-and-delete atomic.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::debug;

use booking_core::result::AppResult;
use booking_core::traits::LockBackend;

/// Stored lock value with its expiry deadline.
#[derive(Debug, Clone)]
struct LockEntry {
    /// Owner value.
    value: String,
    /// Instant after which the entry counts as absent.
    expires_at: Instant,
}

impl LockEntry {
    fn new(value: &str, ttl: Duration, now: Instant) -> Self {
        Self {
            value: value.to_string(),
            expires_at: now
                .checked_add(ttl)
                .unwrap_or_else(|| now + Duration::from_secs(u32::MAX as u64)),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// New keys inserted between sweeps of expired entries.
const PURGE_EVERY: usize = 256;

/// In-memory lock backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryLockBackend {
    /// Lock entries keyed by full lock key.
    entries: Arc<DashMap<String, LockEntry>>,
    /// New keys inserted so far, drives the periodic sweep.
    inserts: Arc<AtomicUsize>,
}

impl MemoryLockBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Purged expired lock entries");
        }
        removed
    }
}

#[async_trait]
impl LockBackend for MemoryLockBackend {
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        let inserted_new_key = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return Ok(false);
                }
                // Expired holder: the key is free again.
                occupied.insert(LockEntry::new(value, ttl, now));
                false
            }
            Entry::Vacant(vacant) => {
                vacant.insert(LockEntry::new(value, ttl, now));
                true
            }
        };

        // Locks that are never released would otherwise stay in the map.
        // The shard guard is dropped here, so sweeping cannot deadlock.
        if inserted_new_key {
            let inserted = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
            if inserted % PURGE_EVERY == 0 {
                self.purge_expired();
            }
        }
        Ok(true)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let now = Instant::now();
        let removed = self
            .entries
            .remove_if(key, |_, entry| entry.is_live(now) && entry.value == expected);
        if removed.is_none() {
            self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        }
        Ok(removed.is_some())
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now)))
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
