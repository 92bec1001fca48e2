//! Event stream version numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of events persisted in a stream.
///
/// A stream that does not exist yet is at version 0. Appending `n` events
/// to a stream at version `v` moves it to `v + n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    /// The version of a stream with no events.
    pub const INITIAL: Version = Version(0);

    /// Create a version from a raw count.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw event count.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The version reached after appending `count` events.
    pub const fn advance(self, count: u64) -> Self {
        Self(self.0 + count)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
