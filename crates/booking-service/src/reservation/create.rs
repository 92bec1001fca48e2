//! Create a session.
//!
//! Never fails on an existing session or a negative seat count; it simply
//! emits nothing. Callers read "no event" as already-created-or-rejected.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use booking_core::events::SessionEvent;
use booking_core::result::AppResult;
use booking_core::types::SessionId;
use booking_domain::Session;

use super::pipeline::{CommandHandler, FollowUp, Outcome};
use crate::deps::WorkflowDeps;

/// Request to create a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSession {
    pub session_id: SessionId,
    pub title: String,
    pub seats: i64,
    pub start_time: DateTime<Utc>,
}

#[async_trait]
impl CommandHandler for CreateSession {
    type Context = ();

    fn name(&self) -> &'static str {
        "CreateSession"
    }

    fn session_id(&self) -> SessionId {
        self.session_id
    }

    async fn validate(&self, _deps: &WorkflowDeps, _state: Option<&Session>) -> AppResult<()> {
        Ok(())
    }

    fn execute(
        &self,
        _deps: &WorkflowDeps,
        state: Option<&Session>,
        _context: &(),
    ) -> AppResult<Vec<SessionEvent>> {
        if state.is_some() {
            debug!(session_id = %self.session_id, "Session already exists");
            return Ok(Vec::new());
        }

        let Ok(total_seats) = u32::try_from(self.seats) else {
            warn!(session_id = %self.session_id, seats = self.seats, "Seat count out of range");
            return Ok(Vec::new());
        };

        Ok(vec![SessionEvent::Created {
            session_id: self.session_id,
            title: self.title.clone(),
            total_seats,
            start_time: self.start_time,
        }])
    }

    async fn finalize(
        &self,
        _deps: &WorkflowDeps,
        _context: Option<()>,
        _outcome: Outcome<'_>,
    ) -> Vec<FollowUp> {
        Vec::new()
    }
}
