//! Event store trait for session event streams.

use async_trait::async_trait;

use crate::events::{RecordedEvent, SessionEvent};
use crate::result::AppResult;
use crate::types::{SessionId, Version};

/// Append-only, per-session event log with optimistic concurrency.
#[async_trait]
pub trait EventStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append `events` to `stream_id`, asserting it is currently at
    /// `expected_version`.
    ///
    /// Returns the new stream version. Fails with
    /// [`ErrorKind::VersionConflict`](crate::error::ErrorKind::VersionConflict)
    /// if another writer appended first. An empty `events` list appends
    /// nothing and returns the current version.
    async fn append(
        &self,
        stream_id: SessionId,
        expected_version: Version,
        events: Vec<SessionEvent>,
    ) -> AppResult<Version>;

    /// Load every event of `stream_id`, oldest first.
    ///
    /// A stream that does not exist yields an empty list.
    async fn load(&self, stream_id: SessionId) -> AppResult<Vec<RecordedEvent>>;
}
