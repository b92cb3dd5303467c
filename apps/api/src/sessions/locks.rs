//! Per-session async locks.
//!
//! Upload, document generation, and reset for one session serialize on the
//! session's lock; distinct sessions proceed independently. In particular,
//! reset is exclusive with an in-flight generation, so a build never
//! references assets that a concurrent reset is deleting.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct SessionLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session's guard, waiting for any holder to release it.
    /// Lock entries live for the process lifetime; the map stays small
    /// because sessions are short-lived and bounded in number.
    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_session_serializes() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("sess-1").await;

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("sess-1")).await;
        assert!(blocked.is_err(), "second acquire must wait for the holder");

        drop(guard);
        let unblocked =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("sess-1")).await;
        assert!(unblocked.is_ok());
    }

    #[tokio::test]
    async fn test_distinct_sessions_are_independent() {
        let locks = SessionLocks::new();
        let _guard = locks.acquire("sess-1").await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.acquire("sess-2")).await;
        assert!(other.is_ok(), "a different session must not block");
    }
}
