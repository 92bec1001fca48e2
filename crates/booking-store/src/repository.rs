//! Session repository: loads aggregates by replaying their streams.

use std::sync::Arc;

use booking_core::events::SessionEvent;
use booking_core::result::AppResult;
use booking_core::traits::EventStore;
use booking_core::types::{SessionId, Version};
use booking_domain::Session;
use booking_domain::session::apply;

/// A session snapshot together with the stream version it was folded from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSession {
    /// `None` if the session was never created.
    pub state: Option<Session>,
    /// Version to pass as `expected_version` when appending.
    pub version: Version,
}

/// Reads and writes session event streams.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    store: Arc<dyn EventStore>,
}

impl SessionRepository {
    /// Create a repository over `store`.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Rebuild the session by folding its full history.
    pub async fn load(&self, session_id: SessionId) -> AppResult<LoadedSession> {
        let events = self.store.load(session_id).await?;
        let version = events
            .last()
            .map(|recorded| recorded.version)
            .unwrap_or(Version::INITIAL);
        let state = events
            .iter()
            .fold(None, |state, recorded| apply(state, &recorded.event));

        Ok(LoadedSession { state, version })
    }

    /// Append `events`, asserting the stream is still at `expected_version`.
    pub async fn append(
        &self,
        session_id: SessionId,
        expected_version: Version,
        events: Vec<SessionEvent>,
    ) -> AppResult<Version> {
        self.store
            .append(session_id, expected_version, events)
            .await
    }
}
