//! Reserve a seat, or join the waitlist when the session is full.
//!
//! Takes no lock: the expected-version check on append is the only guard.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use booking_core::error::AppError;
use booking_core::events::SessionEvent;
use booking_core::result::AppResult;
use booking_core::types::{SessionId, UserId};
use booking_domain::Session;

use super::pipeline::{CommandHandler, FollowUp, Outcome};
use crate::deps::WorkflowDeps;

/// Request for a seat in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSeat {
    pub session_id: SessionId,
    pub user_id: UserId,
}

/// Where the user ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReserveOutcome {
    Reserved,
    Waitlisted,
}

impl ReserveOutcome {
    /// Read the outcome off the committed events.
    pub fn from_events(events: &[SessionEvent]) -> Option<Self> {
        events.iter().find_map(|event| match event {
            SessionEvent::SeatReserved { .. } => Some(Self::Reserved),
            SessionEvent::UserWaitlisted { .. } => Some(Self::Waitlisted),
            _ => None,
        })
    }
}

/// Join time for a new waitlist entry, kept strictly after the current tail
/// so the waitlist stays ordered even if clocks disagree.
fn next_joined_at(session: &Session, now: DateTime<Utc>) -> DateTime<Utc> {
    match session.waitlist.last() {
        Some(tail) if tail.joined_at >= now => tail.joined_at + Duration::microseconds(1),
        _ => now,
    }
}

#[async_trait]
impl CommandHandler for ReserveSeat {
    type Context = ();

    fn name(&self) -> &'static str {
        "ReserveSeat"
    }

    fn session_id(&self) -> SessionId {
        self.session_id
    }

    async fn validate(&self, _deps: &WorkflowDeps, state: Option<&Session>) -> AppResult<()> {
        let session = state.ok_or_else(|| {
            AppError::not_found(format!("Session {} not found", self.session_id))
        })?;

        if session.membership(self.user_id)?.is_some() {
            return Err(AppError::conflict(format!(
                "User {} is already reserved or waitlisted",
                self.user_id
            )));
        }

        Ok(())
    }

    fn execute(
        &self,
        deps: &WorkflowDeps,
        state: Option<&Session>,
        _context: &(),
    ) -> AppResult<Vec<SessionEvent>> {
        let session = state.ok_or_else(|| {
            AppError::not_found(format!("Session {} not found", self.session_id))
        })?;

        let event = if session.has_free_seat() {
            SessionEvent::SeatReserved {
                session_id: self.session_id,
                user_id: self.user_id,
            }
        } else {
            SessionEvent::UserWaitlisted {
                session_id: self.session_id,
                user_id: self.user_id,
                joined_at: next_joined_at(session, deps.clock.now()),
            }
        };

        Ok(vec![event])
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
