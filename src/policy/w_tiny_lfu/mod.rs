//! Adaptive W-TinyLFU replacement/admission policy.
//!
//! Combines an admission window, a segmented-LRU main cache and a count-min
//! frequency sketch with ARC-style ghost feedback that resizes the window at
//! runtime. The engine holds metadata only (the surrounding container owns
//! objects and capacity) and answers one question per unit of space to be
//! freed: which resident key goes next.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         WTinyLfuCore<K> Layout                          │
//! │                                                                         │
//! │   WINDOW (recency trial)          MAIN CACHE (segmented LRU)            │
//! │   ┌─────────────────────┐         ┌──────────────────────────────────┐  │
//! │   │ MRU           LRU   │         │  PROBATION          PROTECTED    │  │
//! │   │  ▼              ▼   │ age-out │  ┌────────────┐     ┌──────────┐ │  │
//! │   │ [new] ◄──► [trial] ─┼────────►│  │ single-hit │ hit │  proven  │ │  │
//! │   │                     │         │  │ candidates ├────►│ frequent │ │  │
//! │   └──────────▲──────────┘         │  └────────────┘     └────┬─────┘ │  │
//! │              │ target               ▲    overflow demotion   │       │  │
//! │   ┌──────────┴──────────┐         │  └──────────◄────────────┘       │  │
//! │   │  AdmissionTarget    │         └──────────────────────────────────┘  │
//! │   │  grows on window-   │                                               │
//! │   │  ghost hits, shrinks│         ┌──────────────────────────────────┐  │
//! │   │  on main-ghost hits │◄────────┤  GhostHistory (evicted keys,     │  │
//! │   └─────────────────────┘         │  tagged with origin segment)     │  │
//! │                                   └──────────────────────────────────┘  │
//! │   FrequencySketch: count-min + doorkeeper, aged every ~capacity         │
//! │   accesses; feeds every duel the arbiter resolves.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//! Per-key lifecycle
//! ─────────────────
//!
//!   fresh insert ──► Window ──(window overflow)──► Probation
//!   Probation ──(hit)──► Protected
//!   Protected ──(protected overflow)──► Probation     (demoted, never lost)
//!   Window/Probation/Protected ──(arbiter)──► Ghost
//!   Ghost ──(re-insert before expiry)──► Protected    (proven reuse)
//!
//! Victim selection
//! ────────────────
//!
//!   choose_victim(resident, incoming):
//!     1. Drop any stale LRU candidates that are no longer resident.
//!     2. w = window LRU; m = probation LRU, else protected LRU.
//!     3. Window below target: evict m (let the window grow) unless m is
//!        hotter than w by the incumbent margin.
//!     4. Otherwise duel on sketch estimates; near-ties evict w, and a
//!        protected m requires a strictly larger gap.
//!     5. Both sides empty: repair metadata from the resident view, retry,
//!        and only then fail.
//! ```
//!
//! ## Operations
//!
//! | Operation       | Time   | Notes                                     |
//! |-----------------|--------|-------------------------------------------|
//! | `choose_victim` | O(1)*  | *Amortized; repair path is O(n)           |
//! | `on_hit`        | O(1)   | May promote probation → protected         |
//! | `on_insert`     | O(1)*  | Ghost consult + window spill              |
//! | `on_evict`      | O(1)   | Records the ghost entry                   |
//! | `reset`         | O(n)   | Clears every component                    |
//!
//! ## Algorithm Properties
//!
//! - **Scan resistance**: one-touch keys never leave window/probation, so a
//!   scan cannot displace proven-frequent protected keys
//! - **Adaptive**: ghost feedback moves capacity between recency-favoring
//!   window and frequency-favoring main cache
//! - **Deterministic**: fixed sketch seeds and a seeded jitter PRNG replay
//!   identical decisions for identical access sequences
//!
//! ## Example Usage
//!
//! ```
//! use std::collections::HashSet;
//! use evictkit::policy::w_tiny_lfu::WTinyLfuCore;
//!
//! let mut policy: WTinyLfuCore<&str> = WTinyLfuCore::new(4);
//! let mut resident = HashSet::new();
//!
//! for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
//!     resident.insert(*key);
//!     policy.on_insert(*key, 1, i as u64);
//! }
//! policy.on_hit(&"b", 4);
//!
//! // Cache is full; pick a victim for the next insertion.
//! let victim = policy.choose_victim(&resident, &"e").unwrap();
//! assert!(resident.contains(victim));
//! assert_ne!(victim, "b", "a re-used key is not the coldest candidate");
//! ```
//!
//! ## Thread Safety
//!
//! - [`WTinyLfuCore`]: not thread-safe, designed for single-threaded use
//! - [`ConcurrentWTinyLfu`] (feature `concurrency`): mutex-wrapped engine;
//!   victim selection, eviction and insertion for one miss must run under
//!   one lock acquisition (see [`ConcurrentWTinyLfu::with`])
//!
//! ## References
//!
//! - Einziger, Friedman & Manes, "TinyLFU: A Highly Efficient Cache
//!   Admission Policy", 2017
//! - Megiddo & Modha, "ARC: A Self-Tuning, Low Overhead Replacement Cache",
//!   FAST 2003
//! - Karedla et al., "Caching Strategies to Improve Disk System
//!   Performance", 1994

pub mod adapt;
pub mod arbiter;
pub mod config;

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::ds::ghost::{GhostHistory, SegmentKind};
use crate::ds::keyed_deque::KeyedDeque;
use crate::ds::sketch::FrequencySketch;
use crate::error::{ConfigError, SelectionError};
use crate::traits::{ReplacementPolicy, ResidentView};

use self::adapt::AdmissionTarget;
use self::arbiter::{Duel, Jitter, Loser, Margins};
pub use self::config::{WTinyLfuConfig, WindowRotation};

/// Size assumed for a resident key the engine had lost track of; the real
/// size lives in the container and is not recoverable during repair.
const DRIFT_SIZE: u64 = 1;

/// Operation counters for the W-TinyLFU engine.
#[cfg(feature = "metrics")]
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct WTinyLfuMetrics {
    /// Hits on window keys.
    pub window_hits: u64,
    /// Hits on probation keys (each one promotes).
    pub probation_hits: u64,
    /// Hits on protected keys.
    pub protected_hits: u64,
    /// Probation → protected promotions.
    pub promotions: u64,
    /// Protected → probation demotions.
    pub demotions: u64,
    /// Keys aged out of the window into the main cache.
    pub window_overflows: u64,
    /// Insertions that hit a window-origin ghost (target grew).
    pub ghost_window_hits: u64,
    /// Insertions that hit a main-origin ghost (target shrank).
    pub ghost_main_hits: u64,
    /// Evictions recorded from the window.
    pub window_evictions: u64,
    /// Evictions recorded from probation.
    pub probation_evictions: u64,
    /// Evictions recorded from protected.
    pub protected_evictions: u64,
    /// Metadata repairs (stale candidates dropped, untracked keys adopted).
    pub repairs: u64,
    /// Trace resets, explicit or detected.
    pub resets: u64,
}

#[cfg(feature = "metrics")]
impl std::fmt::Display for WTinyLfuMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WTinyLfuMetrics {{ hits: {}/{}/{} (win/prob/prot), promotions: {}, \
             demotions: {}, window_overflows: {}, ghost_hits: {}/{} (win/main), \
             evictions: {}/{}/{} (win/prob/prot), repairs: {}, resets: {} }}",
            self.window_hits,
            self.probation_hits,
            self.protected_hits,
            self.promotions,
            self.demotions,
            self.window_overflows,
            self.ghost_window_hits,
            self.ghost_main_hits,
            self.window_evictions,
            self.probation_evictions,
            self.protected_evictions,
            self.repairs,
            self.resets
        )
    }
}

/// Core adaptive W-TinyLFU policy engine.
///
/// Owns all replacement metadata for one cache instance: the three resident
/// segments, the frequency sketch, the ghost history and the adaptive window
/// target. Constructed once per cache; multiple engines never share state.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Clone + Eq + Hash`
///
/// # Example
///
/// ```
/// use evictkit::ds::SegmentKind;
/// use evictkit::policy::w_tiny_lfu::WTinyLfuCore;
///
/// let mut policy: WTinyLfuCore<u64> = WTinyLfuCore::new(100);
///
/// policy.on_insert(1, 1, 0);
/// assert_eq!(policy.segment_of(&1), Some(SegmentKind::Window));
/// assert_eq!(policy.len(), 1);
/// ```
#[derive(Debug)]
pub struct WTinyLfuCore<K>
where
    K: Clone + Eq + Hash,
{
    /// Admission window: MRU at front, LRU at back. Values are entry sizes.
    window: KeyedDeque<K, u64>,
    /// Main-cache probation segment.
    probation: KeyedDeque<K, u64>,
    /// Main-cache protected segment.
    protected: KeyedDeque<K, u64>,

    /// Occupied window size, in capacity units.
    window_used: u64,
    /// Occupied protected size, in capacity units.
    protected_used: u64,

    sketch: FrequencySketch,
    ghosts: GhostHistory<K>,
    target: AdmissionTarget,
    jitter: Jitter,

    config: WTinyLfuConfig,

    /// Internal access tick; timestamps ghost entries.
    tick: u64,
    /// Last `access_index` seen from the container; regression signals a new
    /// trace.
    last_access_index: Option<u64>,

    #[cfg(feature = "metrics")]
    metrics: WTinyLfuMetrics,
}

impl<K> WTinyLfuCore<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates an engine with default tunables for `capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_with_config`](Self::try_with_config)
    /// to handle invalid configuration without panicking.
    pub fn new(capacity: u64) -> Self {
        match Self::try_with_config(WTinyLfuConfig::new(capacity)) {
            Ok(engine) => engine,
            Err(err) => panic!("invalid W-TinyLFU configuration: {err}"),
        }
    }

    /// Creates an engine from an explicit configuration.
    ///
    /// Returns [`ConfigError`] if any parameter fails
    /// [`WTinyLfuConfig::validate`].
    pub fn try_with_config(config: WTinyLfuConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let target = AdmissionTarget::new(
            config.initial_window_target(),
            config.min_window,
            config.capacity,
            config.max_adapt_step(),
        );
        Ok(Self {
            window: KeyedDeque::new(),
            probation: KeyedDeque::new(),
            protected: KeyedDeque::new(),
            window_used: 0,
            protected_used: 0,
            sketch: FrequencySketch::with_age_period(config.capacity, config.effective_age_period()),
            ghosts: GhostHistory::new(config.ghost_capacity()),
            target,
            jitter: Jitter::new(config.seed, config.jitter),
            config,
            tick: 0,
            last_access_index: None,
            #[cfg(feature = "metrics")]
            metrics: WTinyLfuMetrics::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    /// Total cache capacity this engine was configured for.
    pub fn capacity(&self) -> u64 {
        self.config.capacity
    }

    /// Number of keys tracked across all segments.
    pub fn len(&self) -> usize {
        self.window.len() + self.probation.len() + self.protected.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in the admission window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Keys in the probation segment.
    pub fn probation_len(&self) -> usize {
        self.probation.len()
    }

    /// Keys in the protected segment.
    pub fn protected_len(&self) -> usize {
        self.protected.len()
    }

    /// Occupied window size, in capacity units.
    pub fn window_used(&self) -> u64 {
        self.window_used
    }

    /// Occupied protected size, in capacity units.
    pub fn protected_used(&self) -> u64 {
        self.protected_used
    }

    /// Current adaptive window target.
    pub fn window_target(&self) -> u64 {
        self.target.get()
    }

    /// Current protected-size cap: `protected_frac` of the capacity left to
    /// the main cache. Shrinks as the window target grows.
    pub fn protected_target(&self) -> u64 {
        let main = self.config.capacity.saturating_sub(self.target.get());
        (main as f64 * self.config.protected_frac) as u64
    }

    /// Ghost entries currently retained.
    pub fn ghost_len(&self) -> usize {
        self.ghosts.len()
    }

    /// Returns `true` if `key` has a ghost entry.
    pub fn ghost_contains(&self, key: &K) -> bool {
        self.ghosts.contains(key)
    }

    /// Returns which segment currently tracks `key`, if any.
    pub fn segment_of(&self, key: &K) -> Option<SegmentKind> {
        if self.window.contains(key) {
            Some(SegmentKind::Window)
        } else if self.probation.contains(key) {
            Some(SegmentKind::Probation)
        } else if self.protected.contains(key) {
            Some(SegmentKind::Protected)
        } else {
            None
        }
    }

    /// Approximate access frequency of `key` per the sketch, in `[0, 15]`.
    pub fn estimate(&self, key: &K) -> u8 {
        self.sketch.estimate(Self::hash_key(key))
    }

    /// Operation counters.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> &WTinyLfuMetrics {
        &self.metrics
    }

    // -----------------------------------------------------------------------
    // External operations
    // -----------------------------------------------------------------------

    /// Selects the next victim among the resident keys.
    ///
    /// Called once per unit of space that must be freed before an insertion.
    /// The engine does not remove the victim; the container does, then
    /// reports back through [`on_evict`](Self::on_evict) before asking
    /// again.
    ///
    /// Returns [`SelectionError`] only when no resident candidate exists
    /// even after repairing metadata against `resident`: a fatal contract
    /// violation in the surrounding container.
    pub fn choose_victim<R>(&mut self, resident: &R, incoming: &K) -> Result<K, SelectionError>
    where
        R: ResidentView<K> + ?Sized,
    {
        debug_assert!(
            !resident.contains_key(incoming),
            "victim requested for a key that is already resident"
        );

        self.prune_stale_candidates(resident);

        if self.window.is_empty() && self.probation.is_empty() && self.protected.is_empty() {
            if resident.is_empty() {
                return Err(SelectionError::new(
                    "no victim available: resident set is empty",
                ));
            }
            self.repair_with(resident);
        }

        let window_cand = self.window.peek_back().map(|(k, _)| k.clone());
        let main_cand = self
            .probation
            .peek_back()
            .map(|(k, _)| (k.clone(), false))
            .or_else(|| self.protected.peek_back().map(|(k, _)| (k.clone(), true)));

        match (window_cand, main_cand) {
            (None, None) => Err(SelectionError::new(
                "no victim available: all segments empty after repair",
            )),
            (Some(w), None) => Ok(w),
            (None, Some((m, _))) => Ok(m),
            (Some(w), Some((m, main_is_protected))) => {
                let duel = Duel {
                    window_estimate: self.estimate(&w),
                    main_estimate: self.estimate(&m),
                    main_is_protected,
                    window_below_target: self.window_used < self.target.get(),
                };
                let margins = Margins {
                    probation: self.config.probation_bias,
                    protected: self.config.protected_bias,
                };
                match arbiter::resolve_with_jitter(duel, margins, &mut self.jitter) {
                    Loser::Window => Ok(w),
                    Loser::Main => Ok(m),
                }
            },
        }
    }

    /// Records a hit on a resident key.
    ///
    /// Probation keys are promoted to protected on their first hit; the
    /// protected cap is re-enforced synchronously. Window hits follow the
    /// configured [`WindowRotation`]. A resident key the engine was not
    /// tracking is adopted into probation.
    pub fn on_hit(&mut self, key: &K, access_index: u64) {
        self.observe(access_index);
        self.sketch.record(Self::hash_key(key));

        // A resident key must not keep a ghost entry.
        self.ghosts.take(key);

        if self.protected.touch(key) {
            #[cfg(feature = "metrics")]
            {
                self.metrics.protected_hits += 1;
            }
        } else if let Some(size) = self.probation.remove(key) {
            self.protected.push_front(key.clone(), size);
            self.protected_used += size;
            self.enforce_protected_cap();
            #[cfg(feature = "metrics")]
            {
                self.metrics.probation_hits += 1;
                self.metrics.promotions += 1;
            }
        } else if self.window.contains(key) {
            if self.config.window_rotation == WindowRotation::Lru {
                self.window.touch(key);
            }
            #[cfg(feature = "metrics")]
            {
                self.metrics.window_hits += 1;
            }
        } else {
            // Untracked resident key: adopt into probation (conservative).
            self.probation.push_front(key.clone(), DRIFT_SIZE);
            #[cfg(feature = "metrics")]
            {
                self.metrics.repairs += 1;
            }
        }
    }

    /// Records that `key` (of the given size) was just placed into
    /// residency.
    ///
    /// Consults the ghost history first: a returning key re-enters protected
    /// directly and moves the adaptive window target (toward the window for
    /// window-origin ghosts, away from it for main-origin ghosts). Fresh keys
    /// enter the window, which then spills its LRU overflow into probation.
    pub fn on_insert(&mut self, key: K, size: u64, access_index: u64) {
        self.observe(access_index);
        self.sketch.record(Self::hash_key(&key));

        // The container only reports genuinely new keys; anything still
        // tracked here is stale metadata.
        self.untrack(&key);

        let window_ghosts = self.ghosts.window_len();
        let main_ghosts = self.ghosts.main_len();
        match self.ghosts.take(&key) {
            Some(record) => {
                if record.origin.is_window() {
                    self.target.grow(window_ghosts, main_ghosts);
                    #[cfg(feature = "metrics")]
                    {
                        self.metrics.ghost_window_hits += 1;
                    }
                } else {
                    self.target.shrink(window_ghosts, main_ghosts);
                    #[cfg(feature = "metrics")]
                    {
                        self.metrics.ghost_main_hits += 1;
                    }
                }
                // Proven reuse: bypass window and probation entirely.
                self.protected.push_front(key, size);
                self.protected_used += size;
            },
            None => {
                self.window.push_front(key, size);
                self.window_used += size;
            },
        }

        self.spill_window();
        self.enforce_protected_cap();
    }

    /// Records that `evicted` was physically removed to make room for
    /// `incoming`.
    ///
    /// The evicted key leaves its segment and enters the ghost history
    /// tagged with its origin. An untracked eviction is recorded as
    /// probation-origin, mirroring the adoption rule for untracked
    /// residents.
    pub fn on_evict(&mut self, incoming: &K, evicted: &K) {
        debug_assert!(incoming != evicted, "evicting the incoming key");

        let origin = match self.untrack(evicted) {
            Some(origin) => origin,
            None => SegmentKind::Probation,
        };
        self.ghosts.record(evicted.clone(), origin, self.tick);

        #[cfg(feature = "metrics")]
        {
            match origin {
                SegmentKind::Window => self.metrics.window_evictions += 1,
                SegmentKind::Probation => self.metrics.probation_evictions += 1,
                SegmentKind::Protected => self.metrics.protected_evictions += 1,
            }
        }
    }

    /// Discards all metadata and adaptive state, as at the start of a new
    /// trace.
    ///
    /// Also invoked internally when the container's `access_index` moves
    /// backwards, which signals a new trace by contract.
    pub fn reset(&mut self) {
        self.window.clear();
        self.probation.clear();
        self.protected.clear();
        self.window_used = 0;
        self.protected_used = 0;
        self.sketch.clear();
        self.ghosts.clear();
        self.target.reset();
        self.jitter = Jitter::new(self.config.seed, self.config.jitter);
        self.tick = 0;
        self.last_access_index = None;
        #[cfg(feature = "metrics")]
        {
            self.metrics.resets += 1;
        }
    }

    /// Reconciles tracked metadata with the container's resident set.
    ///
    /// Tracked keys that are no longer resident are dropped; resident keys
    /// the engine lost track of are adopted into probation and purged from
    /// the ghost history. Calling this twice in a row with no intervening
    /// operation changes nothing the second time.
    pub fn repair_with<R>(&mut self, resident: &R)
    where
        R: ResidentView<K> + ?Sized,
    {
        let stale: Vec<K> = self
            .window
            .iter()
            .chain(self.probation.iter())
            .chain(self.protected.iter())
            .filter(|(key, _)| !resident.contains_key(key))
            .map(|(key, _)| key.clone())
            .collect();
        let mut missing: Vec<K> = Vec::new();
        resident.for_each_key(&mut |key| {
            if self.segment_of(key).is_none() {
                missing.push(key.clone());
            }
        });

        #[cfg(feature = "metrics")]
        {
            self.metrics.repairs += (stale.len() + missing.len()) as u64;
        }

        for key in stale {
            self.untrack(&key);
        }
        for key in missing {
            self.ghosts.take(&key);
            self.probation.push_front(key, DRIFT_SIZE);
        }
    }

    // -----------------------------------------------------------------------
    // Internal machinery
    // -----------------------------------------------------------------------

    fn hash_key(key: &K) -> u64 {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Advances the access tick and detects trace boundaries.
    fn observe(&mut self, access_index: u64) {
        if self.last_access_index.is_some_and(|last| access_index < last) {
            self.reset();
        }
        self.last_access_index = Some(access_index);
        self.tick += 1;
    }

    /// Removes `key` from whichever segment tracks it.
    fn untrack(&mut self, key: &K) -> Option<SegmentKind> {
        if let Some(size) = self.window.remove(key) {
            self.window_used -= size;
            Some(SegmentKind::Window)
        } else if self.probation.remove(key).is_some() {
            Some(SegmentKind::Probation)
        } else if let Some(size) = self.protected.remove(key) {
            self.protected_used -= size;
            Some(SegmentKind::Protected)
        } else {
            None
        }
    }

    /// Ages the window's LRU keys into the main cache until the window fits
    /// its target again.
    fn spill_window(&mut self) {
        while self.window_used > self.target.get() {
            let Some((key, size)) = self.window.pop_back() else {
                break;
            };
            self.window_used -= size;

            let hot = self
                .config
                .hot_promote_threshold
                .is_some_and(|threshold| self.estimate(&key) >= threshold);
            if hot {
                self.protected.push_front(key, size);
                self.protected_used += size;
            } else {
                self.probation.push_front(key, size);
            }

            #[cfg(feature = "metrics")]
            {
                self.metrics.window_overflows += 1;
            }
        }
    }

    /// Demotes protected LRU keys into probation until the protected segment
    /// fits its cap. Demotion degrades status; it never destroys data.
    fn enforce_protected_cap(&mut self) {
        let cap = self.protected_target();
        while self.protected_used > cap {
            let Some((key, size)) = self.protected.pop_back() else {
                break;
            };
            self.protected_used -= size;
            self.probation.push_front(key, size);
            #[cfg(feature = "metrics")]
            {
                self.metrics.demotions += 1;
            }
        }
    }

    /// Drops LRU candidates that are no longer resident, per segment, so the
    /// arbiter only ever duels live keys.
    fn prune_stale_candidates<R>(&mut self, resident: &R)
    where
        R: ResidentView<K> + ?Sized,
    {
        let (_window_dropped, bytes) = Self::prune_tail(&mut self.window, resident);
        self.window_used -= bytes;
        let (_probation_dropped, _) = Self::prune_tail(&mut self.probation, resident);
        let (_protected_dropped, bytes) = Self::prune_tail(&mut self.protected, resident);
        self.protected_used -= bytes;
        #[cfg(feature = "metrics")]
        {
            self.metrics.repairs += _window_dropped + _probation_dropped + _protected_dropped;
        }
    }

    fn prune_tail<R>(deque: &mut KeyedDeque<K, u64>, resident: &R) -> (u64, u64)
    where
        R: ResidentView<K> + ?Sized,
    {
        let mut dropped = 0u64;
        let mut bytes = 0u64;
        while let Some((key, _)) = deque.peek_back() {
            if resident.contains_key(key) {
                break;
            }
            let key = key.clone();
            if let Some(size) = deque.remove(&key) {
                dropped += 1;
                bytes += size;
            }
        }
        (dropped, bytes)
    }

    /// Verifies the partition and sizing invariants, returning a description
    /// of the first violation found.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), crate::error::InvariantError> {
        use crate::error::InvariantError;

        self.window.debug_validate_invariants();
        self.probation.debug_validate_invariants();
        self.protected.debug_validate_invariants();
        self.ghosts.debug_validate_invariants();

        for (key, _) in self.window.iter() {
            if self.probation.contains(key) || self.protected.contains(key) {
                return Err(InvariantError::new("window key also tracked in main cache"));
            }
        }
        for (key, _) in self.probation.iter() {
            if self.protected.contains(key) {
                return Err(InvariantError::new(
                    "probation key also tracked in protected",
                ));
            }
        }

        let window_sum: u64 = self.window.iter().map(|(_, size)| *size).sum();
        if window_sum != self.window_used {
            return Err(InvariantError::new("window size accounting out of sync"));
        }
        let protected_sum: u64 = self.protected.iter().map(|(_, size)| *size).sum();
        if protected_sum != self.protected_used {
            return Err(InvariantError::new("protected size accounting out of sync"));
        }

        for segment in [&self.window, &self.probation, &self.protected] {
            for (key, _) in segment.iter() {
                if self.ghosts.contains(key) {
                    return Err(InvariantError::new("live key also present in ghost history"));
                }
            }
        }

        if self.ghosts.len() > self.ghosts.capacity() {
            return Err(InvariantError::new("ghost history exceeds its bound"));
        }
        if self.target.get() < self.target.min() || self.target.get() > self.target.max() {
            return Err(InvariantError::new("admission target out of bounds"));
        }
        Ok(())
    }
}

impl<K> ReplacementPolicy<K> for WTinyLfuCore<K>
where
    K: Clone + Eq + Hash,
{
    fn choose_victim<R>(&mut self, resident: &R, incoming: &K) -> Result<K, SelectionError>
    where
        R: ResidentView<K> + ?Sized,
    {
        WTinyLfuCore::choose_victim(self, resident, incoming)
    }

    fn on_hit(&mut self, key: &K, access_index: u64) {
        WTinyLfuCore::on_hit(self, key, access_index);
    }

    fn on_insert(&mut self, key: K, size: u64, access_index: u64) {
        WTinyLfuCore::on_insert(self, key, size, access_index);
    }

    fn on_evict(&mut self, incoming: &K, evicted: &K) {
        WTinyLfuCore::on_evict(self, incoming, evicted);
    }

    fn reset(&mut self) {
        WTinyLfuCore::reset(self);
    }
}

// ---------------------------------------------------------------------------
// Concurrent wrapper
// ---------------------------------------------------------------------------

/// Mutex-wrapped [`WTinyLfuCore`] for use from multiple threads.
///
/// Every operation serializes on one lock, which keeps the
/// `window + probation + protected = resident` invariant trivially intact
/// at the cost of serializing all segment mutation. Callers that need the
/// miss path (select victim, evict, insert) to be one logical transaction
/// should run it inside a single [`with`](Self::with) call.
#[cfg(feature = "concurrency")]
#[derive(Debug)]
pub struct ConcurrentWTinyLfu<K>
where
    K: Clone + Eq + Hash,
{
    inner: parking_lot::Mutex<WTinyLfuCore<K>>,
}

#[cfg(feature = "concurrency")]
impl<K> ConcurrentWTinyLfu<K>
where
    K: Clone + Eq + Hash,
{
    /// Creates a thread-safe engine with default tunables for `capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: parking_lot::Mutex::new(WTinyLfuCore::new(capacity)),
        }
    }

    /// Creates a thread-safe engine from an explicit configuration.
    pub fn try_with_config(config: WTinyLfuConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: parking_lot::Mutex::new(WTinyLfuCore::try_with_config(config)?),
        })
    }

    /// Runs `f` with exclusive access to the engine.
    ///
    /// This is the transaction boundary: victim selection, the container's
    /// physical removal bookkeeping and the insert notification for one miss
    /// belong inside one call.
    pub fn with<R>(&self, f: impl FnOnce(&mut WTinyLfuCore<K>) -> R) -> R {
        let mut engine = self.inner.lock();
        f(&mut engine)
    }

    /// See [`WTinyLfuCore::choose_victim`].
    pub fn choose_victim<R>(&self, resident: &R, incoming: &K) -> Result<K, SelectionError>
    where
        R: ResidentView<K> + ?Sized,
    {
        self.inner.lock().choose_victim(resident, incoming)
    }

    /// See [`WTinyLfuCore::on_hit`].
    pub fn on_hit(&self, key: &K, access_index: u64) {
        self.inner.lock().on_hit(key, access_index);
    }

    /// See [`WTinyLfuCore::on_insert`].
    pub fn on_insert(&self, key: K, size: u64, access_index: u64) {
        self.inner.lock().on_insert(key, size, access_index);
    }

    /// See [`WTinyLfuCore::on_evict`].
    pub fn on_evict(&self, incoming: &K, evicted: &K) {
        self.inner.lock().on_evict(incoming, evicted);
    }

    /// See [`WTinyLfuCore::reset`].
    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Number of keys tracked across all segments.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Total cache capacity this engine was configured for.
    pub fn capacity(&self) -> u64 {
        self.inner.lock().capacity()
    }
}
