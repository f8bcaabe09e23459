//! Bounded, origin-tagged history of evicted keys.
//!
//! Adaptive admission (ARC-style) needs to know not just *that* a key was
//! recently evicted but *where from*: a returning window victim means the
//! window is too small, a returning main victim means the opposite. Each
//! ghost entry therefore records the segment it was evicted from and the
//! access tick of the eviction. Entries hold no values.
//!
//! ## Behavior
//! - `record(k, origin, at)`: appends at the newest end; re-evicting a key
//!   refreshes its entry in place
//! - `take(k)`: consumes the entry for `k`; a ghost is consulted at most once
//! - Trimming is FIFO oldest-first and deterministic; entries are never
//!   dropped by sampling
//!
//! `debug_validate_invariants()` is available in debug/test builds.
use std::hash::Hash;

use crate::ds::keyed_deque::KeyedDeque;

/// Which resident segment a key occupied when it was evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Admission window.
    Window,
    /// Main-cache probation segment.
    Probation,
    /// Main-cache protected segment.
    Protected,
}

impl SegmentKind {
    /// Returns `true` for the admission window, `false` for either main
    /// segment.
    pub fn is_window(self) -> bool {
        matches!(self, SegmentKind::Window)
    }
}

/// Metadata retained for one evicted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostRecord {
    /// Segment the key was evicted from.
    pub origin: SegmentKind,
    /// Access tick at which the eviction happened.
    pub evicted_at: u64,
}

#[derive(Debug)]
/// Bounded FIFO of [`GhostRecord`]s, indexed by key.
pub struct GhostHistory<K> {
    entries: KeyedDeque<K, GhostRecord>,
    capacity: usize,
    window_count: usize,
    main_count: usize,
}

impl<K> GhostHistory<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a ghost history holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: KeyedDeque::with_capacity(capacity),
            capacity,
            window_count: 0,
            main_count: 0,
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of ghosts currently tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no ghosts are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ghosts that originated in the admission window.
    pub fn window_len(&self) -> usize {
        self.window_count
    }

    /// Ghosts that originated in either main segment.
    pub fn main_len(&self) -> usize {
        self.main_count
    }

    /// Returns `true` if `key` has a ghost entry.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Returns the record for `key` without consuming it.
    pub fn peek(&self, key: &K) -> Option<GhostRecord> {
        self.entries.get(key).copied()
    }

    /// Records the eviction of `key` from `origin` at tick `at`.
    ///
    /// A key that already has a ghost entry is refreshed in place. The oldest
    /// entries are trimmed once the capacity bound is exceeded.
    pub fn record(&mut self, key: K, origin: SegmentKind, at: u64) {
        if self.capacity == 0 {
            return;
        }

        let record = GhostRecord {
            origin,
            evicted_at: at,
        };
        if let Some(old) = self.entries.push_front(key, record) {
            self.uncount(old.origin);
        }
        self.count(origin);

        while self.entries.len() > self.capacity {
            if let Some((_, old)) = self.entries.pop_back() {
                self.uncount(old.origin);
            }
        }
    }

    /// Consumes and returns the ghost entry for `key`, if any.
    pub fn take(&mut self, key: &K) -> Option<GhostRecord> {
        let record = self.entries.remove(key)?;
        self.uncount(record.origin);
        Some(record)
    }

    /// Drops all ghost entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.window_count = 0;
        self.main_count = 0;
    }

    fn count(&mut self, origin: SegmentKind) {
        if origin.is_window() {
            self.window_count += 1;
        } else {
            self.main_count += 1;
        }
    }

    fn uncount(&mut self, origin: SegmentKind) {
        if origin.is_window() {
            self.window_count -= 1;
        } else {
            self.main_count -= 1;
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.window_count + self.main_count, self.entries.len());
        assert!(self.entries.len() <= self.capacity);
        let windows = self
            .entries
            .iter()
            .filter(|(_, r)| r.origin.is_window())
            .count();
        assert_eq!(windows, self.window_count);
        self.entries.debug_validate_invariants();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_consumes() {
        let mut ghosts = GhostHistory::new(4);
        ghosts.record("a", SegmentKind::Window, 10);
        ghosts.record("b", SegmentKind::Probation, 11);

        assert_eq!(ghosts.len(), 2);
        assert_eq!(ghosts.window_len(), 1);
        assert_eq!(ghosts.main_len(), 1);

        let rec = ghosts.take(&"a").expect("ghost for a");
        assert_eq!(rec.origin, SegmentKind::Window);
        assert_eq!(rec.evicted_at, 10);
        assert!(!ghosts.contains(&"a"));
        assert_eq!(ghosts.take(&"a"), None);
        ghosts.debug_validate_invariants();
    }

    #[test]
    fn trims_oldest_first() {
        let mut ghosts = GhostHistory::new(2);
        ghosts.record("a", SegmentKind::Window, 1);
        ghosts.record("b", SegmentKind::Probation, 2);
        ghosts.record("c", SegmentKind::Protected, 3);

        assert!(!ghosts.contains(&"a"), "oldest ghost must be trimmed");
        assert!(ghosts.contains(&"b"));
        assert!(ghosts.contains(&"c"));
        assert_eq!(ghosts.window_len(), 0);
        assert_eq!(ghosts.main_len(), 2);
        ghosts.debug_validate_invariants();
    }

    #[test]
    fn re_eviction_refreshes_entry() {
        let mut ghosts = GhostHistory::new(3);
        ghosts.record("a", SegmentKind::Window, 1);
        ghosts.record("b", SegmentKind::Probation, 2);
        ghosts.record("a", SegmentKind::Protected, 9);

        assert_eq!(ghosts.len(), 2);
        let rec = ghosts.peek(&"a").expect("refreshed ghost");
        assert_eq!(rec.origin, SegmentKind::Protected);
        assert_eq!(rec.evicted_at, 9);
        assert_eq!(ghosts.window_len(), 0);

        // "a" was refreshed to newest, so "b" trims first.
        ghosts.record("c", SegmentKind::Window, 10);
        ghosts.record("d", SegmentKind::Window, 11);
        assert!(!ghosts.contains(&"b"));
        assert!(ghosts.contains(&"a"));
        ghosts.debug_validate_invariants();
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut ghosts = GhostHistory::new(0);
        ghosts.record("a", SegmentKind::Window, 1);
        assert!(ghosts.is_empty());
        assert_eq!(ghosts.take(&"a"), None);
    }

    #[test]
    fn clear_resets_counts() {
        let mut ghosts = GhostHistory::new(4);
        ghosts.record("a", SegmentKind::Window, 1);
        ghosts.record("b", SegmentKind::Protected, 2);
        ghosts.clear();

        assert!(ghosts.is_empty());
        assert_eq!(ghosts.window_len(), 0);
        assert_eq!(ghosts.main_len(), 0);
        ghosts.debug_validate_invariants();
    }
}
