//! # booking-service
//!
//! Reservation workflow for conference booking. Commands run through a
//! three-phase pipeline (validate, execute, finalize) against the session
//! aggregate; cancelling a reservation serializes the follow-up promotion
//! through the session lock.
//!
//! Dependencies are passed in at construction time; nothing here reaches
//! for process-wide state.

pub mod commands;
pub mod deps;
pub mod reservation;

pub use commands::{CommandReply, CommandRequest};
pub use deps::{HeldLock, WorkflowDeps};
pub use reservation::{CancelOutcome, ReservationService, ReserveOutcome};
