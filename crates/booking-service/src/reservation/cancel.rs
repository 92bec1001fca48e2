//! Cancel a reservation or leave the waitlist.
//!
//! Giving up a seat takes the session lock before the cancellation is
//! written. If users are waiting, the lock is not released here: it travels
//! with the promotion follow-up, which releases it when done. Leaving the
//! waitlist frees no seat and takes no lock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use booking_core::error::AppError;
use booking_core::events::SessionEvent;
use booking_core::result::AppResult;
use booking_core::types::{SessionId, UserId};
use booking_domain::{Membership, Session};
use booking_lock::keys;

use super::pipeline::{CommandHandler, FollowUp, Outcome};
use crate::deps::{HeldLock, WorkflowDeps};

/// Request to give up a seat or a waitlist place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelReservation {
    pub session_id: SessionId,
    pub user_id: UserId,
}

/// What was given up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelOutcome {
    /// A seat was freed.
    SeatReleased,
    /// A waitlist place was dropped.
    LeftWaitlist,
}

impl CancelOutcome {
    /// Read the outcome off the committed events.
    pub fn from_events(events: &[SessionEvent]) -> Option<Self> {
        events.iter().find_map(|event| match event {
            SessionEvent::ReservationCancelled { .. } => Some(Self::SeatReleased),
            SessionEvent::WaitlistEntryReleased { .. } => Some(Self::LeftWaitlist),
            _ => None,
        })
    }
}

/// Per-attempt state of a cancellation.
#[derive(Debug)]
pub enum CancelContext {
    /// The user holds a seat; the session lock is held.
    Reserved(HeldLock),
    /// The user is waiting; no lock.
    Waitlisted,
}

#[async_trait]
impl CommandHandler for CancelReservation {
    type Context = CancelContext;

    fn name(&self) -> &'static str {
        "CancelReservation"
    }

    fn session_id(&self) -> SessionId {
        self.session_id
    }

    async fn validate(
        &self,
        deps: &WorkflowDeps,
        state: Option<&Session>,
    ) -> AppResult<CancelContext> {
        let session = state.ok_or_else(|| {
            AppError::not_found(format!("Session {} not found", self.session_id))
        })?;

        let membership = session.membership(self.user_id).inspect_err(|e| {
            error!(
                session_id = %self.session_id,
                user_id = %self.user_id,
                error = %e,
                "Session state is corrupt"
            );
        })?;

        match membership {
            None => Err(AppError::not_found(format!(
                "User {} has no reservation in session {}",
                self.user_id, self.session_id
            ))),
            Some(Membership::Waitlisted) => Ok(CancelContext::Waitlisted),
            Some(Membership::Reserved) => {
                let token = deps
                    .lock
                    .try_acquire_with_backoff(
                        &keys::session_lock(self.session_id),
                        deps.lock_ttl,
                        &deps.backoff,
                        &deps.cancel,
                    )
                    .await?;

                match token {
                    Some(token) => Ok(CancelContext::Reserved(HeldLock::acquired(token))),
                    None => {
                        warn!(
                            session_id = %self.session_id,
                            user_id = %self.user_id,
                            "Could not get session lock"
                        );
                        Err(AppError::conflict("Could not get session lock"))
                    }
                }
            }
        }
    }

    fn execute(
        &self,
        _deps: &WorkflowDeps,
        _state: Option<&Session>,
        context: &CancelContext,
    ) -> AppResult<Vec<SessionEvent>> {
        let event = match context {
            CancelContext::Reserved(_) => SessionEvent::ReservationCancelled {
                session_id: self.session_id,
                user_id: self.user_id,
            },
            CancelContext::Waitlisted => SessionEvent::WaitlistEntryReleased {
                session_id: self.session_id,
                user_id: self.user_id,
            },
        };
        Ok(vec![event])
    }

    async fn finalize(
        &self,
        deps: &WorkflowDeps,
        context: Option<CancelContext>,
        outcome: Outcome<'_>,
    ) -> Vec<FollowUp> {
        let Some(CancelContext::Reserved(held)) = context else {
            return Vec::new();
        };

        if let Outcome::Committed { events, state } = outcome {
            let seat_freed = CancelOutcome::from_events(events) == Some(CancelOutcome::SeatReleased);
            let someone_waiting = state.is_some_and(|s| !s.waitlist.is_empty());

            if seat_freed && someone_waiting {
                info!(
                    session_id = %self.session_id,
                    resource_key = %held.token.resource_key,
                    "Handing session lock to waitlist promotion"
                );
                return vec![FollowUp::Promote {
                    session_id: self.session_id,
                    held,
                }];
            }
        }

        deps.release(&held).await;
        Vec::new()
    }
}
