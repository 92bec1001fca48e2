//! Lock key builders.
//!
//! Centralising key construction keeps unrelated resources on disjoint
//! keys. The backend-wide prefix (`lock:` by default) is added by
//! [`DistributedLock`](crate::DistributedLock); aggregate namespaces are
//! added by [`ScopedLock`](crate::ScopedLock).

use booking_core::types::SessionId;

/// Namespace for locks guarding session aggregates.
pub const SESSION_NAMESPACE: &str = "Session";

/// Resource key of the lock that serializes cancel/promote for one session.
pub fn session_lock(session_id: SessionId) -> String {
    format!("session:{session_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_session_lock_key() {
        let id = SessionId::from(Uuid::nil());
        assert_eq!(
            session_lock(id),
            "session:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_distinct_sessions_never_share_a_key() {
        assert_ne!(session_lock(SessionId::new()), session_lock(SessionId::new()));
    }
}
