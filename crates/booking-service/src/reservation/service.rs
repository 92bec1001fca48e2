//! Reservation service: entry point for session commands and queries.

use std::collections::VecDeque;

use tracing::{info, warn};

use booking_core::config::workflow::WorkflowConfig;
use booking_core::error::AppError;
use booking_core::events::SessionEvent;
use booking_core::result::AppResult;
use booking_core::types::SessionId;
use booking_domain::Session;
use booking_store::SessionRepository;

use super::cancel::{CancelOutcome, CancelReservation};
use super::create::CreateSession;
use super::pipeline::{Committed, FollowUp, Pipeline};
use super::promote::{PromoteFromWaitlist, PromoteHandler};
use super::reserve::{ReserveOutcome, ReserveSeat};
use crate::deps::WorkflowDeps;

/// Runs reservation commands and the follow-ups they trigger.
#[derive(Debug, Clone)]
pub struct ReservationService {
    pipeline: Pipeline,
}

impl ReservationService {
    /// Creates a new reservation service.
    pub fn new(repository: SessionRepository, deps: WorkflowDeps, config: &WorkflowConfig) -> Self {
        Self {
            pipeline: Pipeline::new(repository, deps, config),
        }
    }

    /// The shared collaborators.
    pub fn deps(&self) -> &WorkflowDeps {
        self.pipeline.deps()
    }

    /// Create a session. Returns `false` if nothing was created because the
    /// session exists or the seat count is negative.
    pub async fn create_session(&self, command: CreateSession) -> AppResult<bool> {
        let committed = self.pipeline.run(&command).await?;
        let created = !committed.events.is_empty();
        if created {
            info!(session_id = %command.session_id, seats = command.seats, "Session created");
        }
        self.dispatch(committed.follow_ups).await;
        Ok(created)
    }

    /// Reserve a seat, or waitlist the user if the session is full.
    pub async fn reserve(&self, command: ReserveSeat) -> AppResult<ReserveOutcome> {
        let committed = self.pipeline.run(&command).await?;
        self.complete(committed, ReserveOutcome::from_events)
            .await
            .ok_or_else(|| AppError::internal("Reservation committed no seat event"))
    }

    /// Cancel a reservation or waitlist place. A freed seat goes to the
    /// head of the waitlist before this returns.
    pub async fn cancel(&self, command: CancelReservation) -> AppResult<CancelOutcome> {
        let committed = self.pipeline.run(&command).await?;
        self.complete(committed, CancelOutcome::from_events)
            .await
            .ok_or_else(|| AppError::internal("Cancellation committed no event"))
    }

    /// Promote under a lock token obtained elsewhere. Never fails; returns
    /// whether someone was promoted. The token is released either way.
    pub async fn promote(&self, command: PromoteFromWaitlist) -> bool {
        self.run_promotion(PromoteHandler::from(command)).await
    }

    /// Current snapshot of a session.
    pub async fn get_session(&self, session_id: SessionId) -> AppResult<Session> {
        self.pipeline
            .repository()
            .load(session_id)
            .await?
            .state
            .ok_or_else(|| AppError::not_found(format!("Session {session_id} not found")))
    }

    /// Dispatch the follow-ups of `committed`, then read its outcome.
    ///
    /// Follow-ups may own the session lock, so they run even when the
    /// outcome turns out to be unreadable.
    async fn complete<T>(
        &self,
        committed: Committed,
        outcome: impl FnOnce(&[SessionEvent]) -> Option<T>,
    ) -> Option<T> {
        self.dispatch(committed.follow_ups).await;
        outcome(&committed.events)
    }

    async fn dispatch(&self, follow_ups: Vec<FollowUp>) {
        let mut queue: VecDeque<FollowUp> = follow_ups.into();
        while let Some(follow_up) = queue.pop_front() {
            match follow_up {
                FollowUp::Promote { session_id, held } => {
                    self.run_promotion(PromoteHandler { session_id, held }).await;
                }
            }
        }
    }

    async fn run_promotion(&self, handler: PromoteHandler) -> bool {
        let session_id = handler.session_id;
        match self.pipeline.run(&handler).await {
            Ok(committed) => !committed.events.is_empty(),
            Err(e) => {
                warn!(%session_id, error = %e, "Waitlist promotion failed");
                false
            }
        }
    }
}
