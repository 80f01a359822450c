//! Simulation Clock
//!
//! Monotonic simulated time, independent of wall-clock time. Pausing is
//! expressed by advancing with `dt = 0`; the clock never runs backwards.

use serde::{Serialize, Deserialize};

/// Simulated time in seconds plus the tick counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    now: f64,
    tick: u32,
}

impl SimClock {
    /// Clock at time zero, tick zero.
    pub const fn new() -> Self {
        Self { now: 0.0, tick: 0 }
    }

    /// Current simulated time in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of ticks advanced so far.
    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Advance by `dt` seconds.
    ///
    /// Returns false (and leaves the clock untouched) for a zero, negative or
    /// non-finite step.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        self.now += dt as f64;
        self.tick = self.tick.wrapping_add(1);
        true
    }
}
