//! In-memory event store using dashmap.
//!
//! Each append runs under the shard lock of its stream, so the expected
//! version check and the write are atomic per stream.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use booking_core::error::AppError;
use booking_core::events::{RecordedEvent, SessionEvent};
use booking_core::result::AppResult;
use booking_core::traits::{Clock, EventStore, SystemClock};
use booking_core::types::{SessionId, Version};

/// In-memory, per-session event store.
#[derive(Debug, Clone)]
pub struct InMemoryEventStore {
    /// Streams keyed by session.
    streams: Arc<DashMap<SessionId, Vec<RecordedEvent>>>,
    /// Source of `recorded_at` timestamps.
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    /// Create an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store stamped by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            streams: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of streams that have at least one event.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    fn record(
        &self,
        stream_id: SessionId,
        start: Version,
        events: Vec<SessionEvent>,
    ) -> Vec<RecordedEvent> {
        let recorded_at = self.clock.now();
        events
            .into_iter()
            .enumerate()
            .map(|(offset, event)| RecordedEvent {
                stream_id,
                version: start.advance(offset as u64 + 1),
                recorded_at,
                event,
            })
            .collect()
    }
}

fn conflict(stream_id: SessionId, expected: Version, actual: Version) -> AppError {
    AppError::version_conflict(format!(
        "Stream {stream_id} is at version {actual}, expected {expected}"
    ))
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        stream_id: SessionId,
        expected_version: Version,
        events: Vec<SessionEvent>,
    ) -> AppResult<Version> {
        let count = events.len() as u64;

        match self.streams.entry(stream_id) {
            Entry::Occupied(mut occupied) => {
                let actual = Version::new(occupied.get().len() as u64);
                if actual != expected_version {
                    return Err(conflict(stream_id, expected_version, actual));
                }
                if count == 0 {
                    return Ok(actual);
                }
                let recorded = self.record(stream_id, actual, events);
                occupied.get_mut().extend(recorded);
                debug!(%stream_id, version = %actual.advance(count), count, "Events appended");
                Ok(actual.advance(count))
            }
            Entry::Vacant(vacant) => {
                if expected_version != Version::INITIAL {
                    return Err(conflict(stream_id, expected_version, Version::INITIAL));
                }
                if count == 0 {
                    return Ok(Version::INITIAL);
                }
                vacant.insert(self.record(stream_id, Version::INITIAL, events));
                debug!(%stream_id, version = count, count, "Stream started");
                Ok(Version::new(count))
            }
        }
    }

    async fn load(&self, stream_id: SessionId) -> AppResult<Vec<RecordedEvent>> {
        Ok(self
            .streams
            .get(&stream_id)
            .map(|stream| stream.value().clone())
            .unwrap_or_default())
    }
}
