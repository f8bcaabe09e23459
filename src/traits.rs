//! # Policy Trait Surface
//!
//! This module defines the boundary between a replacement-policy engine and
//! the cache container that hosts it. The container owns the objects and the
//! capacity accounting; the policy owns only per-key metadata and answers
//! one question: *which resident key should go next?*
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                     surrounding container                    │
//!   │                                                              │
//!   │   owns objects, sizes, capacity; rejects objects larger      │
//!   │   than the cache outright                                    │
//!   └───────┬──────────────────────────────────────────▲───────────┘
//!           │ on_hit / on_insert / on_evict / reset    │ victim key
//!           ▼                                          │
//!   ┌──────────────────────────────────────────────────┴───────────┐
//!   │                 ReplacementPolicy<K>                         │
//!   │                                                              │
//!   │   choose_victim(&resident, &incoming) -> Result<K, _>        │
//!   │   on_hit(&key, access_index)                                 │
//!   │   on_insert(key, size, access_index)                         │
//!   │   on_evict(&incoming, &evicted)                              │
//!   │   reset()                                                    │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Call protocol
//!
//! | Call            | When the container makes it                          |
//! |-----------------|------------------------------------------------------|
//! | `choose_victim` | Once per unit of space to free, before an insertion  |
//! | `on_evict`      | Immediately after physically removing the victim     |
//! | `on_insert`     | Immediately after placing the new key into residency |
//! | `on_hit`        | After a hit is recognized; key is always resident    |
//! | `reset`         | When a new trace/session begins                      |
//!
//! The container guarantees: keys are non-empty, sizes are positive, and
//! `access_index` is monotonically non-decreasing within one trace (a
//! smaller value signals a new trace). `choose_victim` must return a key
//! that is resident at the moment of the call; anything else is a fatal
//! contract violation surfaced as [`SelectionError`].
//!
//! ## ResidentView
//!
//! [`ResidentView`] is how the policy sees ground truth without owning it.
//! It is implemented for the obvious standard containers keyed by `K`, and
//! for slices (linear scan, intended for tests).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{BuildHasher, Hash};

use crate::error::SelectionError;

/// Read-only view of the keys currently resident in the cache container.
///
/// Used by [`ReplacementPolicy::choose_victim`] to validate candidates and
/// to repair metadata that has drifted from ground truth.
pub trait ResidentView<K> {
    /// Returns `true` if `key` is currently resident.
    fn contains_key(&self, key: &K) -> bool;

    /// Number of resident keys.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits every resident key once, in the view's own order.
    fn for_each_key(&self, visit: &mut dyn FnMut(&K));
}

impl<K, S> ResidentView<K> for HashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn contains_key(&self, key: &K) -> bool {
        self.contains(key)
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn for_each_key(&self, visit: &mut dyn FnMut(&K)) {
        for key in self.iter() {
            visit(key);
        }
    }
}

impl<K, V, S> ResidentView<K> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn contains_key(&self, key: &K) -> bool {
        HashMap::contains_key(self, key)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn for_each_key(&self, visit: &mut dyn FnMut(&K)) {
        for key in self.keys() {
            visit(key);
        }
    }
}

impl<K> ResidentView<K> for BTreeSet<K>
where
    K: Ord,
{
    fn contains_key(&self, key: &K) -> bool {
        self.contains(key)
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn for_each_key(&self, visit: &mut dyn FnMut(&K)) {
        for key in self.iter() {
            visit(key);
        }
    }
}

impl<K, V> ResidentView<K> for BTreeMap<K, V>
where
    K: Ord,
{
    fn contains_key(&self, key: &K) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn for_each_key(&self, visit: &mut dyn FnMut(&K)) {
        for key in self.keys() {
            visit(key);
        }
    }
}

/// Linear-scan view over a slice of keys. O(n) membership; intended for
/// tests and tiny resident sets.
impl<K> ResidentView<K> for [K]
where
    K: PartialEq,
{
    fn contains_key(&self, key: &K) -> bool {
        self.iter().any(|k| k == key)
    }

    fn len(&self) -> usize {
        <[K]>::len(self)
    }

    fn for_each_key(&self, visit: &mut dyn FnMut(&K)) {
        for key in self.iter() {
            visit(key);
        }
    }
}

/// A cache replacement/admission policy engine.
///
/// Implementations hold per-key metadata (never values) and keep it
/// synchronized with the container through the four notification calls.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use evictkit::policy::w_tiny_lfu::WTinyLfuCore;
/// use evictkit::traits::ReplacementPolicy;
///
/// // Works against any policy engine.
/// fn warm<P: ReplacementPolicy<&'static str>>(policy: &mut P, keys: &[&'static str]) {
///     for (i, key) in keys.iter().enumerate() {
///         policy.on_insert(*key, 1, i as u64);
///     }
/// }
///
/// let mut policy: WTinyLfuCore<&str> = WTinyLfuCore::new(2);
/// let resident: HashSet<&str> = ["a", "b"].into_iter().collect();
/// warm(&mut policy, &["a", "b"]);
///
/// // Cache full; a third key needs a victim first.
/// let victim = policy.choose_victim(&resident, &"c").unwrap();
/// assert!(resident.contains(victim));
/// ```
pub trait ReplacementPolicy<K> {
    /// Selects the next victim among the resident keys.
    ///
    /// Called once per unit of space that must be freed. The policy does not
    /// remove the victim itself; the container does, then reports back via
    /// [`on_evict`](Self::on_evict).
    fn choose_victim<R>(&mut self, resident: &R, incoming: &K) -> Result<K, SelectionError>
    where
        R: ResidentView<K> + ?Sized;

    /// Records a hit on a resident key.
    fn on_hit(&mut self, key: &K, access_index: u64);

    /// Records that `key` (of the given size) was just placed into residency.
    fn on_insert(&mut self, key: K, size: u64, access_index: u64);

    /// Records that `evicted` was physically removed to make room for
    /// `incoming`.
    fn on_evict(&mut self, incoming: &K, evicted: &K);

    /// Discards all per-key metadata and adaptive state, as at the start of
    /// a new trace.
    fn reset(&mut self);
}
