//! Session lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SessionId, UserId};

/// Events that create and mutate a session aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// The session was created.
    Created {
        /// The session ID.
        session_id: SessionId,
        /// Display title.
        title: String,
        /// Seat capacity.
        total_seats: u32,
        /// When the session starts.
        start_time: DateTime<Utc>,
    },
    /// A user took a free seat.
    SeatReserved {
        /// The session ID.
        session_id: SessionId,
        /// The user ID.
        user_id: UserId,
    },
    /// A user joined the tail of the waitlist because the session was full.
    UserWaitlisted {
        /// The session ID.
        session_id: SessionId,
        /// The user ID.
        user_id: UserId,
        /// Position key for FIFO ordering.
        joined_at: DateTime<Utc>,
    },
    /// A reserved user gave up their seat.
    ReservationCancelled {
        /// The session ID.
        session_id: SessionId,
        /// The user ID.
        user_id: UserId,
    },
    /// A waitlisted user left the waitlist.
    WaitlistEntryReleased {
        /// The session ID.
        session_id: SessionId,
        /// The user ID.
        user_id: UserId,
    },
    /// The head of the waitlist was moved into a reservation.
    TopWaitlistPromoted {
        /// The session ID.
        session_id: SessionId,
    },
}

impl SessionEvent {
    /// The session this event applies to.
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::Created { session_id, .. }
            | Self::SeatReserved { session_id, .. }
            | Self::UserWaitlisted { session_id, .. }
            | Self::ReservationCancelled { session_id, .. }
            | Self::WaitlistEntryReleased { session_id, .. }
            | Self::TopWaitlistPromoted { session_id } => *session_id,
        }
    }

    /// Stable event type name, used in logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => "Created",
            Self::SeatReserved { .. } => "SeatReserved",
            Self::UserWaitlisted { .. } => "UserWaitlisted",
            Self::ReservationCancelled { .. } => "ReservationCancelled",
            Self::WaitlistEntryReleased { .. } => "WaitlistEntryReleased",
            Self::TopWaitlistPromoted { .. } => "TopWaitlistPromoted",
        }
    }
}
