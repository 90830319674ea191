//! Short-horizon request coalescing.
//!
//! The cache maps a request key to the handle of the call that was started
//! for it, plus the instant that call was started. An entry moves through
//! three states:
//!
//! ```text
//! ABSENT ──insert──▶ PENDING ──window elapses──▶ EXPIRED ──sweep──▶ ABSENT
//! ```
//!
//! Only `PENDING` entries are handed out. `EXPIRED` entries are invisible to
//! [`DedupCache::lookup`] and are overwritten by the next insert for the same
//! key, or dropped by [`DedupCache::sweep`], which the dispatcher runs at the
//! start of every deduplicated call.
//!
//! This is coalescing, not response caching: a call that already settled
//! keeps serving joiners only until its window runs out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::clock::{Clock, SystemClock};
use crate::constants::DEDUPLICATION_WINDOW;

#[derive(Debug)]
struct Entry<V> {
    handle: V,
    created_at: Instant,
}

/// Keyed store of in-flight call handles with a fixed visibility window.
#[derive(Debug)]
pub struct DedupCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> DedupCache<V> {
    /// Creates a cache with the default window and the system clock.
    pub fn new() -> Self {
        Self::with_clock(DEDUPLICATION_WINDOW, Arc::new(SystemClock))
    }

    /// Creates a cache with a custom window and clock.
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window,
            clock,
        }
    }

    /// Returns the visibility window.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        // Entries hold no invariants a panicking writer could break halfway.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn is_live(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.created_at) < self.window
    }

    /// Returns the handle for `key` if its entry is still inside the window.
    pub fn lookup(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entries = self.lock();
        entries
            .get(key)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| entry.handle.clone())
    }

    /// Stores `handle` under `key`, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, handle: V) {
        let created_at = self.clock.now();
        self.lock().insert(key.into(), Entry { handle, created_at });
    }

    /// Returns the live handle for `key`, or stores and returns the one built
    /// by `make`. The boolean is true when an existing handle was joined.
    ///
    /// Lookup and insert happen under one lock, so racing callers always end
    /// up sharing a single entry.
    pub fn join_or_insert<F>(&self, key: &str, make: F) -> (V, bool)
    where
        F: FnOnce() -> V,
    {
        let now = self.clock.now();
        let mut entries = self.lock();

        if let Some(entry) = entries.get(key).filter(|entry| self.is_live(entry, now)) {
            trace!(key = %key, "Joining in-flight request");
            return (entry.handle.clone(), true);
        }

        let handle = make();
        entries.insert(
            key.to_string(),
            Entry {
                handle: handle.clone(),
                created_at: now,
            },
        );
        (handle, false)
    }

    /// Drops every entry older than the window. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.created_at) <= self.window);
        let removed = before - entries.len();
        if removed > 0 {
            trace!(removed, remaining = entries.len(), "Swept expired entries");
        }
        removed
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<V: Clone> Default for DedupCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache() -> (DedupCache<u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = DedupCache::with_clock(Duration::from_millis(300), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_lookup_within_window() {
        let (cache, clock) = cache();
        cache.insert("k", 1);
        clock.advance(Duration::from_millis(299));
        assert_eq!(cache.lookup("k"), Some(1));
    }

    #[test]
    fn test_lookup_after_window_is_absent_but_not_swept() {
        let (cache, clock) = cache();
        cache.insert("k", 1);
        clock.advance(Duration::from_millis(300));
        assert_eq!(cache.lookup("k"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_overwrites_expired_entry() {
        let (cache, clock) = cache();
        cache.insert("k", 1);
        clock.advance(Duration::from_millis(400));
        cache.insert("k", 2);
        assert_eq!(cache.lookup("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (cache, clock) = cache();
        cache.insert("old", 1);
        clock.advance(Duration::from_millis(301));
        cache.insert("fresh", 2);

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("fresh"), Some(2));
    }

    #[test]
    fn test_join_or_insert() {
        let (cache, clock) = cache();

        let (first, joined) = cache.join_or_insert("k", || 1);
        assert_eq!((first, joined), (1, false));

        clock.advance(Duration::from_millis(100));
        let (second, joined) = cache.join_or_insert("k", || 2);
        assert_eq!((second, joined), (1, true));

        clock.advance(Duration::from_millis(200));
        let (third, joined) = cache.join_or_insert("k", || 3);
        assert_eq!((third, joined), (3, false));
    }

    #[test]
    fn test_keys_are_independent() {
        let (cache, _clock) = cache();
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.lookup("a"), Some(1));
        assert_eq!(cache.lookup("b"), Some(2));
        assert_eq!(cache.lookup("c"), None);
    }
}
