//! Promote the head of the waitlist into a reservation.
//!
//! Runs inside the lock handed over by a cancellation and always releases
//! it once the command is done, whatever the result. A missing session or
//! an empty waitlist is a quiet no-op.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use booking_core::events::SessionEvent;
use booking_core::result::AppResult;
use booking_core::types::SessionId;
use booking_domain::Session;
use booking_lock::LockToken;

use super::pipeline::{CommandHandler, FollowUp, Outcome};
use crate::deps::{HeldLock, WorkflowDeps};

/// Request to promote, carrying the session lock it runs under.
///
/// The token can cross a process boundary in its compact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteFromWaitlist {
    pub session_id: SessionId,
    pub token: LockToken,
}

/// Handler for [`PromoteFromWaitlist`] with the lock it must release.
#[derive(Debug)]
pub(crate) struct PromoteHandler {
    pub(crate) session_id: SessionId,
    pub(crate) held: HeldLock,
}

impl From<PromoteFromWaitlist> for PromoteHandler {
    fn from(command: PromoteFromWaitlist) -> Self {
        Self {
            session_id: command.session_id,
            held: HeldLock::transferred(command.token),
        }
    }
}

#[async_trait]
impl CommandHandler for PromoteHandler {
    type Context = ();

    fn name(&self) -> &'static str {
        "PromoteFromWaitlist"
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
        let Some(session) = state else {
            debug!(session_id = %self.session_id, "Session gone; nothing to promote");
            return Ok(Vec::new());
        };

        // A reservation can take the freed seat before promotion runs.
        let Some(head) = session.waitlist_head().filter(|_| session.has_free_seat()) else {
            debug!(session_id = %self.session_id, "No promotion possible");
            return Ok(Vec::new());
        };

        info!(
            session_id = %self.session_id,
            user_id = %head.user_id,
            "Promoting waitlist head"
        );
        Ok(vec![SessionEvent::TopWaitlistPromoted {
            session_id: self.session_id,
        }])
    }

    async fn finalize(
        &self,
        deps: &WorkflowDeps,
        _context: Option<()>,
        outcome: Outcome<'_>,
    ) -> Vec<FollowUp> {
        // The lock belongs to the command, not the attempt.
        if outcome.is_terminal() {
            deps.release(&self.held).await;
        }
        Vec::new()
    }
}
