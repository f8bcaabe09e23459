//! Tunable parameters for the W-TinyLFU policy engine.
//!
//! The corpus this policy descends from tunes every constant empirically, so
//! nothing is hard-coded: window share, protected share, ghost retention,
//! duel margins, aging cadence and jitter are all configuration. The
//! defaults are the mid-range values that behave well across mixed
//! workloads; [`WTinyLfuConfig::validate`] rejects values that would make
//! the engine degenerate.

use crate::error::ConfigError;

/// How the admission window treats a hit on one of its own keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowRotation {
    /// Refresh the key to the window's MRU position (true LRU).
    #[default]
    Lru,
    /// Leave the key in place; only its frequency is bumped. More
    /// scan-resistant, loses exact recency.
    Fifo,
}

/// Configuration for [`WTinyLfuCore`](super::WTinyLfuCore).
///
/// # Example
///
/// ```
/// use evictkit::policy::w_tiny_lfu::{WTinyLfuConfig, WTinyLfuCore};
///
/// let mut cfg = WTinyLfuConfig::new(1_000);
/// cfg.window_frac = 0.10;
/// cfg.ghost_multiplier = 3.0;
/// let engine: WTinyLfuCore<u64> = WTinyLfuCore::try_with_config(cfg).unwrap();
/// assert_eq!(engine.capacity(), 1_000);
/// ```
#[derive(Debug, Clone)]
pub struct WTinyLfuConfig {
    /// Total cache capacity, in the container's size units.
    pub capacity: u64,
    /// Initial admission-window share of `capacity`, in `(0.0, 1.0)`.
    pub window_frac: f64,
    /// Lower clamp for the adaptive window target, in size units.
    pub min_window: u64,
    /// Protected share of the main (non-window) capacity, in `[0.0, 1.0]`.
    pub protected_frac: f64,
    /// Ghost history bound as a multiple of `capacity`, typically 1.0–5.0.
    pub ghost_multiplier: f64,
    /// Upper bound on one adaptive step, as a fraction of `capacity`.
    pub max_adapt_frac: f64,
    /// Frequency margin a window challenger must beat to displace a
    /// probation incumbent.
    pub probation_bias: u8,
    /// Frequency margin against a protected incumbent; wider, since
    /// protected status already represents proven value.
    pub protected_bias: u8,
    /// Accesses between sketch agings; `None` derives `max(64, capacity)`.
    pub age_period: Option<u64>,
    /// Window behavior on a window hit.
    pub window_rotation: WindowRotation,
    /// If set, a window key whose estimate reaches this value at overflow
    /// time is promoted straight to protected instead of probation.
    pub hot_promote_threshold: Option<u8>,
    /// Probability of inverting a duel verdict, in `[0.0, 1.0]`. Breaks
    /// synchronized thrashing loops; `0.0` disables jitter entirely.
    pub jitter: f64,
    /// Seed for the jitter PRNG. Fixed seed, fixed decisions.
    pub seed: u64,
}

impl WTinyLfuConfig {
    /// Creates a configuration with default tunables for `capacity`.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            window_frac: 0.05,
            min_window: 1,
            protected_frac: 0.8,
            ghost_multiplier: 2.0,
            max_adapt_frac: 0.125,
            probation_bias: 1,
            protected_bias: 3,
            age_period: None,
            window_rotation: WindowRotation::default(),
            hot_promote_threshold: None,
            jitter: 0.0,
            seed: 0x9E37_79B9_7F4A_7C15,
        }
    }

    /// Initial window target in size units: `capacity * window_frac`,
    /// clamped to `[min_window, capacity]`.
    pub fn initial_window_target(&self) -> u64 {
        let raw = (self.capacity as f64 * self.window_frac) as u64;
        raw.clamp(self.min_window.min(self.capacity), self.capacity)
    }

    /// Ghost capacity bound in entries.
    pub fn ghost_capacity(&self) -> usize {
        (self.capacity as f64 * self.ghost_multiplier) as usize
    }

    /// Largest single adaptive step: `max(1, capacity * max_adapt_frac)`.
    pub fn max_adapt_step(&self) -> u64 {
        ((self.capacity as f64 * self.max_adapt_frac) as u64).max(1)
    }

    /// Accesses between sketch agings.
    pub fn effective_age_period(&self) -> u64 {
        self.age_period.unwrap_or_else(|| self.capacity.max(64))
    }

    /// Checks every parameter, returning a [`ConfigError`] naming the first
    /// one that is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        if !self.window_frac.is_finite() || !(0.0..1.0).contains(&self.window_frac) {
            return Err(ConfigError::new(format!(
                "window_frac must be in [0.0, 1.0), got {}",
                self.window_frac
            )));
        }
        if self.min_window == 0 || self.min_window > self.capacity {
            return Err(ConfigError::new(format!(
                "min_window must be in [1, capacity], got {}",
                self.min_window
            )));
        }
        if !self.protected_frac.is_finite() || !(0.0..=1.0).contains(&self.protected_frac) {
            return Err(ConfigError::new(format!(
                "protected_frac must be in [0.0, 1.0], got {}",
                self.protected_frac
            )));
        }
        if !self.ghost_multiplier.is_finite() || self.ghost_multiplier < 0.0 {
            return Err(ConfigError::new(format!(
                "ghost_multiplier must be finite and non-negative, got {}",
                self.ghost_multiplier
            )));
        }
        if !self.max_adapt_frac.is_finite() || !(0.0..=1.0).contains(&self.max_adapt_frac) {
            return Err(ConfigError::new(format!(
                "max_adapt_frac must be in [0.0, 1.0], got {}",
                self.max_adapt_frac
            )));
        }
        if self.age_period == Some(0) {
            return Err(ConfigError::new("age_period must be > 0 when set"));
        }
        if !self.jitter.is_finite() || !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::new(format!(
                "jitter must be in [0.0, 1.0], got {}",
                self.jitter
            )));
        }
        Ok(())
    }
}
