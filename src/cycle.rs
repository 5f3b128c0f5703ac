//! Capture cycle tracking
//!
//! Each capture→classify→lookup→respond run is a [`Cycle`] with its own
//! cancellation token. Beginning a new cycle cancels the one in flight, so a
//! late result from an older cycle is discarded instead of applied.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// A single in-flight pipeline run
#[derive(Debug, Clone)]
pub struct Cycle {
    id: u64,
    token: CancellationToken,
}

impl Cycle {
    /// Monotonic identifier, unique per tracker
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Token cancelled when the cycle is stopped or superseded
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Tracks the current cycle for one session
#[derive(Debug, Default)]
pub struct CycleTracker {
    next_id: AtomicU64,
    current: Mutex<Option<Cycle>>,
}

impl CycleTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle, cancelling any cycle still in flight
    pub fn begin(&self) -> Cycle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let cycle = Cycle {
            id,
            token: CancellationToken::new(),
        };

        let previous = self.lock().replace(cycle.clone());
        if let Some(previous) = previous {
            previous.token.cancel();
            tracing::debug!(superseded = previous.id, cycle = id, "cycle superseded");
        }

        cycle
    }

    /// Cancel the cycle in flight; returns whether there was one
    pub fn cancel(&self) -> bool {
        let Some(current) = self.lock().take() else {
            return false;
        };
        current.token.cancel();
        tracing::debug!(cycle = current.id, "cycle cancelled");
        true
    }

    /// Whether `id` is still the cycle in flight
    #[must_use]
    pub fn is_current(&self, id: u64) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|c| c.id == id && !c.token.is_cancelled())
    }

    /// Mark `id` as complete; returns false if it was superseded or cancelled
    pub fn finish(&self, id: u64) -> bool {
        let mut current = self.lock();
        match current.as_ref() {
            Some(c) if c.id == id && !c.token.is_cancelled() => {
                current.take();
                true
            }
            _ => false,
        }
    }

    /// Identifier of the cycle in flight, if any
    #[must_use]
    pub fn active(&self) -> Option<u64> {
        self.lock().as_ref().map(|c| c.id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Cycle>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-session cycle trackers for hosts serving many sessions
#[derive(Debug, Default)]
pub struct CycleRegistry {
    sessions: Mutex<HashMap<String, Arc<CycleTracker>>>,
}

impl CycleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker for a session, created on first use
    #[must_use]
    pub fn tracker(&self, session_id: &str) -> Arc<CycleTracker> {
        let mut sessions = self.lock();
        Arc::clone(sessions.entry(session_id.to_string()).or_default())
    }

    /// Drop a session's tracker once it is idle and no caller still holds it
    ///
    /// Callers drop their own handle from [`tracker`](Self::tracker) first.
    /// Returns whether the entry was removed.
    pub fn release(&self, session_id: &str) -> bool {
        let mut sessions = self.lock();
        let idle = sessions
            .get(session_id)
            .is_some_and(|t| Arc::strong_count(t) == 1 && t.active().is_none());
        if idle {
            sessions.remove(session_id);
        }
        idle
    }

    /// Number of sessions with a live tracker
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<CycleTracker>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_supersedes_previous() {
        let tracker = CycleTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!tracker.is_current(first.id()));
        assert!(tracker.is_current(second.id()));
        assert!(second.id() > first.id());
    }

    #[test]
    fn test_finish_only_current() {
        let tracker = CycleTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        assert!(!tracker.finish(first.id()));
        assert!(tracker.finish(second.id()));
        assert_eq!(tracker.active(), None);
    }

    #[test]
    fn test_cancel() {
        let tracker = CycleTracker::new();
        assert!(!tracker.cancel());

        let cycle = tracker.begin();
        assert!(tracker.cancel());
        assert!(cycle.is_cancelled());
        assert!(!tracker.finish(cycle.id()));
    }

    #[test]
    fn test_registry_reuses_tracker_per_session() {
        let registry = CycleRegistry::new();
        let a = registry.tracker("a");
        let cycle = a.begin();

        assert_eq!(registry.tracker("a").active(), Some(cycle.id()));
        assert_eq!(registry.tracker("b").active(), None);
    }

    #[test]
    fn test_finished_one_shot_sessions_are_released() {
        let registry = CycleRegistry::new();

        for i in 0..1000 {
            let session_id = format!("one-shot-{i}");
            let tracker = registry.tracker(&session_id);
            let cycle = tracker.begin();
            assert!(tracker.finish(cycle.id()));
            drop(tracker);
            assert!(registry.release(&session_id));
        }

        assert!(registry.is_empty());
    }

    #[test]
    fn test_release_keeps_busy_or_shared_trackers() {
        let registry = CycleRegistry::new();

        // Still in flight
        let busy = registry.tracker("busy");
        let cycle = busy.begin();
        drop(busy);
        assert!(!registry.release("busy"));

        // Idle, but another request holds it
        let shared = registry.tracker("shared");
        assert!(!registry.release("shared"));
        assert_eq!(registry.len(), 2);

        drop(shared);
        assert!(registry.release("shared"));
        assert!(registry.tracker("busy").finish(cycle.id()));
        assert!(registry.release("busy"));
        assert!(registry.is_empty());

        assert!(!registry.release("unknown"));
    }
}
