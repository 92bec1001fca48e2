//! Shared value types.

pub mod id;
pub mod version;

pub use id::{SessionId, UserId};
pub use version::Version;
