//! Adaptive sizing of the admission window (ARC-style).
//!
//! The window target is a single scalar steered by ghost feedback: a
//! returning window victim proves the window too small, a returning main
//! victim proves the main cache too small. The step is proportional to the
//! imbalance between the two ghost populations (the rarer the ghost class
//! being hit, the harder it pulls) but always bounded per access and
//! clamped to `[min, capacity]` so a burst of ghost hits cannot slam the
//! target from one extreme to the other.

/// Adaptive target size for the admission window, in capacity units.
#[derive(Debug, Clone)]
pub struct AdmissionTarget {
    target: u64,
    initial: u64,
    min: u64,
    max: u64,
    max_step: u64,
}

impl AdmissionTarget {
    /// Creates a target starting at `initial`, clamped to `[min, max]`, with
    /// per-adjustment steps capped at `max_step`.
    pub fn new(initial: u64, min: u64, max: u64, max_step: u64) -> Self {
        let initial = initial.clamp(min, max);
        Self {
            target: initial,
            initial,
            min,
            max,
            max_step: max_step.max(1),
        }
    }

    /// Current target value.
    pub fn get(&self) -> u64 {
        self.target
    }

    /// Lower clamp bound.
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Upper clamp bound.
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Grows the window target after a window-origin ghost hit.
    ///
    /// `window_ghosts` / `main_ghosts` are the ghost populations at the time
    /// of the hit; the applied (clamped) step is returned.
    pub fn grow(&mut self, window_ghosts: usize, main_ghosts: usize) -> u64 {
        let step = self.step(main_ghosts, window_ghosts);
        let before = self.target;
        self.target = self.target.saturating_add(step).min(self.max);
        self.target - before
    }

    /// Shrinks the window target after a main-origin ghost hit.
    pub fn shrink(&mut self, window_ghosts: usize, main_ghosts: usize) -> u64 {
        let step = self.step(window_ghosts, main_ghosts);
        let before = self.target;
        self.target = self.target.saturating_sub(step).max(self.min);
        before - self.target
    }

    /// Restores the initial target.
    pub fn reset(&mut self) {
        self.target = self.initial;
    }

    // ARC rule: step = max(1, |other| / |own|), bounded by max_step. `own`
    // is the ghost class that was hit.
    fn step(&self, other: usize, own: usize) -> u64 {
        let ratio = if own == 0 {
            1
        } else {
            ((other / own) as u64).max(1)
        };
        ratio.min(self.max_step)
    }
}
