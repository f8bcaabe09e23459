//! Victim arbitration: the window-vs-main duel.
//!
//! Given both segments' LRU candidates and their sketch estimates, the
//! arbiter decides which side loses. Two regimes:
//!
//! - **Window growth** (window below its target): the main candidate is
//!   preferred as victim so the window can grow, unless the main candidate
//!   is demonstrably hotter than the window candidate by the incumbent
//!   margin, in which case displacing it would be a mistake.
//! - **Steady state** (window at/over target): a straight frequency duel.
//!   The challenger (window side) must beat the incumbent by a margin to
//!   win; near-ties evict the challenger, which is cheaper to re-acquire.
//!   Protected incumbents get a wider margin than probation ones.
//!
//! An optional seeded jitter inverts the verdict with small probability to
//! break synchronized thrashing loops. With jitter disabled the duel is a
//! pure function of its inputs.

/// Which segment loses the duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loser {
    /// Evict the admission window's LRU candidate.
    Window,
    /// Evict the main cache's LRU candidate.
    Main,
}

/// Inputs to one duel round.
#[derive(Debug, Clone, Copy)]
pub struct Duel {
    /// Sketch estimate of the window candidate.
    pub window_estimate: u8,
    /// Sketch estimate of the main candidate.
    pub main_estimate: u8,
    /// The main candidate was drawn from the protected segment.
    pub main_is_protected: bool,
    /// The window currently occupies less than its adaptive target.
    pub window_below_target: bool,
}

/// Margin configuration for the duel.
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    /// Required gap against a probation incumbent.
    pub probation: u8,
    /// Required gap against a protected incumbent.
    pub protected: u8,
}

impl Margins {
    fn for_incumbent(&self, protected: bool) -> u16 {
        if protected {
            u16::from(self.protected)
        } else {
            u16::from(self.probation)
        }
    }
}

/// Resolves one duel. Pure; jitter is applied separately by the caller.
pub fn resolve(duel: Duel, margins: Margins) -> Loser {
    let w = u16::from(duel.window_estimate);
    let m = u16::from(duel.main_estimate);
    let margin = margins.for_incumbent(duel.main_is_protected);

    if duel.window_below_target {
        // Let the window grow, but spare a clearly valuable main victim.
        if m > w + margin { Loser::Window } else { Loser::Main }
    } else if w > m + margin {
        Loser::Main
    } else {
        Loser::Window
    }
}

/// XorShift64 PRNG for eviction jitter.
///
/// Deliberately tiny and deterministic: the same seed replays the same
/// decision sequence, so tests can pin jittered behavior exactly.
#[derive(Debug, Clone)]
pub struct Jitter {
    state: u64,
    epsilon: f64,
}

impl Jitter {
    /// Creates a jitter source flipping verdicts with probability
    /// `epsilon`.
    pub fn new(seed: u64, epsilon: f64) -> Self {
        Self {
            // XorShift state must be non-zero.
            state: if seed == 0 { 0x4D59_5DF4_D0F3_3173 } else { seed },
            epsilon,
        }
    }

    /// Returns `true` if the current verdict should be inverted.
    ///
    /// Never advances the PRNG when jitter is disabled, so an
    /// `epsilon = 0.0` engine is bit-for-bit identical to one with no
    /// jitter at all.
    pub fn flips(&mut self) -> bool {
        if self.epsilon <= 0.0 {
            return false;
        }
        self.next_f64() < self.epsilon
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        // 53 high-quality bits into [0, 1).
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Resolves a duel and applies jitter.
pub fn resolve_with_jitter(duel: Duel, margins: Margins, jitter: &mut Jitter) -> Loser {
    let loser = resolve(duel, margins);
    if jitter.flips() {
        match loser {
            Loser::Window => Loser::Main,
            Loser::Main => Loser::Window,
        }
    } else {
        loser
    }
}
