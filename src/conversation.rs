//! Session-keyed conversation log
//!
//! An append-only, in-memory store. Construct one per process (or per test)
//! and share it by `Arc`; nothing here is global.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Ordered message history per session
#[derive(Debug, Default)]
pub struct ConversationLog {
    sessions: RwLock<HashMap<String, Vec<String>>>,
}

impl ConversationLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a session, creating the session if needed
    pub fn append(&self, session_id: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(session_id, message = %message, "storing conversation message");

        self.write()
            .entry(session_id.to_string())
            .or_default()
            .push(message);
    }

    /// Messages for a session in append order; empty when unknown
    #[must_use]
    pub fn read(&self, session_id: &str) -> Vec<String> {
        let history = self.read_lock().get(session_id).cloned().unwrap_or_default();
        tracing::debug!(session_id, count = history.len(), "read conversation history");
        history
    }

    /// Number of messages stored for a session
    #[must_use]
    pub fn len(&self, session_id: &str) -> usize {
        self.read_lock().get(session_id).map_or(0, Vec::len)
    }

    /// Number of sessions with at least one message
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.read_lock().len()
    }

    // A poisoned lock still holds a consistent map: every write is a single push
    fn read_lock(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<String>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<String>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_read_unknown_session_is_empty() {
        let log = ConversationLog::new();
        assert!(log.read("nobody").is_empty());
        assert_eq!(log.len("nobody"), 0);
        assert_eq!(log.session_count(), 0);
    }

    #[test]
    fn test_append_preserves_order() {
        let log = ConversationLog::new();
        log.append("s1", "first");
        log.append("s1", "second");
        log.append("s1", "first");

        assert_eq!(log.read("s1"), ["first", "second", "first"]);
        assert_eq!(log.len("s1"), 3);
    }

    #[test]
    fn test_sessions_are_independent() {
        let log = ConversationLog::new();
        log.append("a", "hello");
        log.append("b", "bonjour");
        log.append("a", "again");

        assert_eq!(log.read("a"), ["hello", "again"]);
        assert_eq!(log.read("b"), ["bonjour"]);
        assert_eq!(log.session_count(), 2);
    }

    #[test]
    fn test_separate_instances_do_not_share_state() {
        let one = ConversationLog::new();
        let two = ConversationLog::new();
        one.append("s", "only in one");
        assert!(two.read("s").is_empty());
    }

    #[test]
    fn test_log_stays_usable_after_poison() {
        let log = Arc::new(ConversationLog::new());
        log.append("s", "before");

        let poisoner = Arc::clone(&log);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        log.append("s", "after");
        assert_eq!(log.read("s"), ["before", "after"]);
        assert_eq!(log.len("s"), 2);
        assert_eq!(log.session_count(), 1);
    }
}
