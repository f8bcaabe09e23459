// ==============================================
// POLICY INVARIANT TESTS (integration)
// ==============================================
//
// Drives the W-TinyLFU engine the way a real cache container would (hits,
// victim selection, evictions, insertions) and verifies the engine-wide
// invariants after every operation: segment partition, eviction validity,
// ghost boundedness, protected cap, and adaptive-target bounds.

use std::collections::HashSet;

use evictkit::ds::SegmentKind;
use evictkit::policy::w_tiny_lfu::{WTinyLfuConfig, WTinyLfuCore};

// ==============================================
// Minimal container harness
// ==============================================
//
// Owns the resident set and capacity accounting (unit-size objects) and
// forwards the container contract to the policy engine, asserting the
// engine's side of the contract on every step.

struct Harness {
    policy: WTinyLfuCore<u64>,
    resident: HashSet<u64>,
    capacity: usize,
    clock: u64,
}

impl Harness {
    fn new(capacity: usize) -> Self {
        Self {
            policy: WTinyLfuCore::new(capacity as u64),
            resident: HashSet::new(),
            capacity,
            clock: 0,
        }
    }

    fn with_config(capacity: usize, config: WTinyLfuConfig) -> Self {
        Self {
            policy: WTinyLfuCore::try_with_config(config).unwrap(),
            resident: HashSet::new(),
            capacity,
            clock: 0,
        }
    }

    /// One access: hit or miss-with-insertion, like the container's `get`.
    /// Returns `true` on hit.
    fn access(&mut self, key: u64) -> bool {
        let index = self.clock;
        self.clock += 1;

        if self.resident.contains(&key) {
            self.policy.on_hit(&key, index);
            self.verify();
            return true;
        }

        while self.resident.len() >= self.capacity {
            let victim = self
                .policy
                .choose_victim(&self.resident, &key)
                .expect("victim must exist while the cache is full");
            assert!(
                self.resident.remove(&victim),
                "eviction validity: victim {victim} must be resident"
            );
            self.policy.on_evict(&key, &victim);
        }

        self.resident.insert(key);
        self.policy.on_insert(key, 1, index);
        self.verify();
        false
    }

    /// Engine-wide invariants, checked after every operation.
    fn verify(&self) {
        self.policy.check_invariants().unwrap();

        // Partition: window ∪ probation ∪ protected == resident, exactly.
        assert_eq!(self.policy.len(), self.resident.len());
        for key in &self.resident {
            assert!(
                self.policy.segment_of(key).is_some(),
                "resident key {key} must be tracked in exactly one segment"
            );
        }

        // Protected cap and adaptive bounds.
        assert!(self.policy.protected_used() <= self.policy.protected_target());
        assert!(self.policy.window_target() >= 1);
        assert!(self.policy.window_target() <= self.policy.capacity());

        // Ghost boundedness.
        assert!(self.policy.ghost_len() <= 2 * self.capacity);
    }
}

// ==============================================
// Lifecycle scenarios
// ==============================================

mod lifecycle {
    use super::*;

    // Capacity 4, window target 1: A,B,C,D inserted, B hit twice, then E
    // arrives. B must be protected; the duel between D (window LRU) and A
    // (probation LRU) is a frequency tie, which deterministically evicts the
    // window side.
    #[test]
    fn duel_tie_breaks_toward_window_candidate() {
        let mut h = Harness::new(4);
        assert_eq!(h.policy.window_target(), 1);

        for key in [10, 11, 12, 13] {
            h.access(key);
        }
        h.access(11);
        h.access(11);
        assert_eq!(h.policy.segment_of(&11), Some(SegmentKind::Protected));

        let victim = h.policy.choose_victim(&h.resident, &14).unwrap();
        assert_eq!(victim, 13, "tie must evict the window candidate");
    }

    #[test]
    fn fresh_key_walks_window_then_probation_then_protected() {
        let mut h = Harness::new(8);
        h.access(1);
        assert_eq!(h.policy.segment_of(&1), Some(SegmentKind::Window));

        h.access(2); // pushes 1 out of the single-slot window
        assert_eq!(h.policy.segment_of(&1), Some(SegmentKind::Probation));

        h.access(1); // first reuse promotes
        assert_eq!(h.policy.segment_of(&1), Some(SegmentKind::Protected));
    }

    #[test]
    fn hot_keys_survive_cold_traffic() {
        let mut h = Harness::new(8);
        let hot = [1u64, 2, 3, 4];

        // Warm the hot set into protected.
        for _ in 0..3 {
            for &key in &hot {
                h.access(key);
            }
        }
        // Interleave hot hits with a stream of one-touch cold keys.
        for i in 0..200u64 {
            h.access(hot[(i % 4) as usize]);
            h.access(1_000 + i);
        }
        for &key in &hot {
            assert!(
                h.resident.contains(&key),
                "hot key {key} must survive cold traffic"
            );
        }
    }
}

// ==============================================
// Ghost-driven adaptation
// ==============================================

mod adaptation {
    use super::*;

    // A key evicted from the window and re-inserted before its ghost expires
    // is a proven reuse: it re-enters protected directly and the admission
    // target grows by one bounded step.
    #[test]
    fn window_ghost_readmission_grows_target() {
        let mut h = Harness::new(16);
        h.access(7);
        assert_eq!(h.policy.segment_of(&7), Some(SegmentKind::Window));

        // Container-side eviction of 7 (window origin).
        h.resident.remove(&7);
        h.policy.on_evict(&99, &7);
        assert!(h.policy.ghost_contains(&7));

        let before = h.policy.window_target();
        h.access(7);
        assert_eq!(h.policy.segment_of(&7), Some(SegmentKind::Protected));
        assert_eq!(h.policy.window_target(), before + 1);
    }

    #[test]
    fn target_never_leaves_bounds_under_ghost_pressure() {
        let mut h = Harness::new(8);
        // Churn far more distinct keys than capacity, with periodic repeats
        // so both ghost classes get hits.
        for round in 0..20u64 {
            for i in 0..24u64 {
                h.access(round * 7 + i);
            }
        }
        assert!(h.policy.window_target() >= 1);
        assert!(h.policy.window_target() <= 8);
    }

    #[test]
    fn ghost_history_is_bounded_by_its_multiple() {
        let mut cfg = WTinyLfuConfig::new(8);
        cfg.ghost_multiplier = 2.0;
        let mut h = Harness::with_config(8, cfg);

        for i in 0..500u64 {
            h.access(i);
        }
        assert!(h.policy.ghost_len() <= 16);
    }
}

// ==============================================
// Scan resistance
// ==============================================

mod scan_resistance {
    use super::*;

    // A pure scan of capacity² never-repeated keys must not populate the
    // protected segment: one-touch keys never earn promotion.
    #[test]
    fn pure_scan_leaves_protected_empty() {
        let capacity = 16;
        let mut h = Harness::new(capacity);

        for key in 0..(capacity * capacity) as u64 {
            h.access(key);
            assert_eq!(
                h.policy.protected_len(),
                0,
                "a scan must never promote anything"
            );
        }
    }

    #[test]
    fn scan_does_not_displace_protected_keys() {
        let mut h = Harness::new(8);
        // 3 pushes both hot keys out of the window; the re-accesses then
        // promote them from probation.
        for key in [1u64, 2, 3, 1, 2] {
            h.access(key);
        }
        assert_eq!(h.policy.segment_of(&1), Some(SegmentKind::Protected));
        assert_eq!(h.policy.segment_of(&2), Some(SegmentKind::Protected));

        for key in 100..160u64 {
            h.access(key);
        }
        assert!(h.resident.contains(&1), "scan evicted a protected key");
        assert!(h.resident.contains(&2), "scan evicted a protected key");
    }
}

// ==============================================
// Consistency guard
// ==============================================

mod consistency {
    use super::*;

    #[test]
    fn repair_is_idempotent() {
        let mut h = Harness::new(8);
        for key in [1u64, 2, 3] {
            h.access(key);
        }
        // Simulate drift: the container knows about a key the engine missed.
        h.resident.insert(50);

        h.policy.repair_with(&h.resident);
        let len = h.policy.len();
        let probation = h.policy.probation_len();

        h.policy.repair_with(&h.resident);
        assert_eq!(h.policy.len(), len);
        assert_eq!(h.policy.probation_len(), probation);
        assert_eq!(h.policy.segment_of(&50), Some(SegmentKind::Probation));
    }

    #[test]
    fn victims_remain_valid_after_metadata_loss() {
        let mut h = Harness::new(4);
        for key in [1u64, 2, 3, 4] {
            h.access(key);
        }
        // Engine loses everything; residency is unchanged.
        h.policy.reset();

        let victim = h.policy.choose_victim(&h.resident, &9).unwrap();
        assert!(h.resident.contains(&victim));
    }

    #[test]
    fn access_index_regression_starts_a_fresh_trace() {
        let mut h = Harness::new(8);
        for key in [1u64, 2, 3] {
            h.access(key);
        }
        assert!(h.policy.len() > 0);

        // New trace: the container restarts its access counter and its
        // residency from scratch.
        h.resident.clear();
        h.clock = 0;
        h.access(42);
        assert_eq!(h.policy.len(), 1);
        assert_eq!(h.policy.segment_of(&42), Some(SegmentKind::Window));
    }
}

// ==============================================
// Long-run soak
// ==============================================

mod soak {
    use super::*;

    // Deterministic mixed workload: skewed repeats, bursts of fresh keys and
    // occasional returns of old keys, with every invariant checked after
    // every operation by the harness.
    #[test]
    fn invariants_hold_across_long_mixed_workload() {
        let mut h = Harness::new(32);
        let mut hits = 0u64;

        for i in 0..3_000u64 {
            let key = match i % 7 {
                0 | 1 => i % 13,         // small hot set
                2 | 3 | 4 => 100 + i % 61, // medium working set
                5 => 1_000 + i,          // fresh one-touch keys
                _ => 100 + (i / 2) % 61, // returns of the medium set
            };
            if h.access(key) {
                hits += 1;
            }
        }

        assert!(hits > 0, "workload must produce hits");
        assert_eq!(h.policy.len(), h.resident.len());
        assert!(h.resident.len() <= 32);
    }
}
