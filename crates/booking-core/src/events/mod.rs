//! Domain events appended to session event streams.
//!
//! Events are the only source of session state: the aggregate in
//! `booking-domain` is rebuilt by folding them in stream order.

pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SessionId, Version};

pub use session::SessionEvent;

/// An event as persisted in a stream, with its position and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// The stream this event belongs to.
    pub stream_id: SessionId,
    /// Stream version after this event was appended (first event is 1).
    pub version: Version,
    /// When the store accepted the event.
    pub recorded_at: DateTime<Utc>,
    /// The event payload.
    pub event: SessionEvent,
}
