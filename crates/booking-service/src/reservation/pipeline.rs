//! Three-phase command pipeline.
//!
//! Every command is run as load → `validate` → `execute` → append →
//! `finalize`. `finalize` is called on every exit path, including load and
//! validation failures, so resources taken in `validate` (the session lock)
//! are always released or handed on.
//!
//! A stale expected version on append re-runs the whole attempt against a
//! fresh load, up to the configured number of retries.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use booking_core::config::workflow::WorkflowConfig;
use booking_core::events::SessionEvent;
use booking_core::result::AppResult;
use booking_core::types::{SessionId, Version};
use booking_domain::Session;
use booking_domain::session::apply;
use booking_store::SessionRepository;

use crate::deps::{HeldLock, WorkflowDeps};

/// How an attempt ended, as seen by `finalize`.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// `events` were appended (possibly none). `state` is the session after them.
    Committed {
        events: &'a [SessionEvent],
        state: Option<&'a Session>,
    },
    /// The append hit a version conflict; the command will run again.
    Retrying,
    /// The command failed and will not run again.
    Aborted,
}

impl Outcome<'_> {
    /// Whether this attempt is the last one.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Retrying)
    }
}

/// Work a committed command hands to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Promote the waitlist head while still holding `held`.
    Promote {
        session_id: SessionId,
        held: HeldLock,
    },
}

/// A command against one session aggregate.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Per-attempt data produced by `validate`.
    type Context: Send;

    /// Command name for logs.
    fn name(&self) -> &'static str;

    /// The session stream this command writes to.
    fn session_id(&self) -> SessionId;

    /// Check the command against the current state and take any resources
    /// the attempt needs.
    async fn validate(
        &self,
        deps: &WorkflowDeps,
        state: Option<&Session>,
    ) -> AppResult<Self::Context>;

    /// Decide which events to emit. Must not have side effects.
    fn execute(
        &self,
        deps: &WorkflowDeps,
        state: Option<&Session>,
        context: &Self::Context,
    ) -> AppResult<Vec<SessionEvent>>;

    /// Release or hand on what `validate` took. `context` is `None` when
    /// the attempt failed before validation produced one.
    async fn finalize(
        &self,
        deps: &WorkflowDeps,
        context: Option<Self::Context>,
        outcome: Outcome<'_>,
    ) -> Vec<FollowUp>;
}

/// Result of a successfully run command.
#[derive(Debug)]
pub struct Committed {
    /// Events appended by the final attempt.
    pub events: Vec<SessionEvent>,
    /// Stream version after the append.
    pub version: Version,
    /// Work to dispatch now that the events are durable.
    pub follow_ups: Vec<FollowUp>,
}

/// Runs command handlers against the session repository.
#[derive(Debug, Clone)]
pub struct Pipeline {
    repository: SessionRepository,
    deps: WorkflowDeps,
    append_retries: u32,
}

impl Pipeline {
    /// Create a pipeline.
    pub fn new(repository: SessionRepository, deps: WorkflowDeps, config: &WorkflowConfig) -> Self {
        Self {
            repository,
            deps,
            append_retries: config.append_retries,
        }
    }

    /// The session repository.
    pub fn repository(&self) -> &SessionRepository {
        &self.repository
    }

    /// The shared collaborators.
    pub fn deps(&self) -> &WorkflowDeps {
        &self.deps
    }

    /// Run `handler` to completion.
    pub async fn run<H: CommandHandler>(&self, handler: &H) -> AppResult<Committed> {
        let session_id = handler.session_id();
        let command = handler.name();
        let mut retries = 0u32;

        loop {
            let loaded = match self.repository.load(session_id).await {
                Ok(loaded) => loaded,
                Err(e) => {
                    handler.finalize(&self.deps, None, Outcome::Aborted).await;
                    return Err(e);
                }
            };
            let state = loaded.state.as_ref();

            let context = match handler.validate(&self.deps, state).await {
                Ok(context) => context,
                Err(e) => {
                    debug!(command, %session_id, error = %e, "Command rejected");
                    handler.finalize(&self.deps, None, Outcome::Aborted).await;
                    return Err(e);
                }
            };

            let events = match handler.execute(&self.deps, state, &context) {
                Ok(events) => events,
                Err(e) => {
                    handler
                        .finalize(&self.deps, Some(context), Outcome::Aborted)
                        .await;
                    return Err(e);
                }
            };

            if events.is_empty() {
                debug!(command, %session_id, "Command produced no events");
                let follow_ups = handler
                    .finalize(
                        &self.deps,
                        Some(context),
                        Outcome::Committed { events: &[], state },
                    )
                    .await;
                return Ok(Committed {
                    events,
                    version: loaded.version,
                    follow_ups,
                });
            }

            match self
                .repository
                .append(session_id, loaded.version, events.clone())
                .await
            {
                Ok(version) => {
                    let after = events.iter().fold(loaded.state.clone(), apply);
                    let event_types: Vec<&str> =
                        events.iter().map(SessionEvent::event_type).collect();
                    info!(command, %session_id, %version, events = ?event_types, "Command committed");
                    let follow_ups = handler
                        .finalize(
                            &self.deps,
                            Some(context),
                            Outcome::Committed {
                                events: &events,
                                state: after.as_ref(),
                            },
                        )
                        .await;
                    return Ok(Committed {
                        events,
                        version,
                        follow_ups,
                    });
                }
                Err(e) if e.is_version_conflict() && retries < self.append_retries => {
                    handler
                        .finalize(&self.deps, Some(context), Outcome::Retrying)
                        .await;
                    retries += 1;
                    warn!(command, %session_id, retry = retries, "Version conflict, re-running command");
                }
                Err(e) => {
                    handler
                        .finalize(&self.deps, Some(context), Outcome::Aborted)
                        .await;
                    return Err(e);
                }
            }
        }
    }
}
