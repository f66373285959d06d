//! Time abstraction so every clock read in the core can be replayed
//! deterministically (§9 "Timekeeping"). All timestamps are 64-bit signed
//! integers in 100-nanosecond ticks from an arbitrary fixed epoch (§3).

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

pub trait TimeProvider: Send + Sync {
    /// Current time in 100-ns ticks.
    fn now(&self) -> i64;
}

/// Wall-clock time, measured as ticks elapsed since the provider was built.
pub struct SystemTime {
    epoch: Instant,
}

impl SystemTime {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTime {
    fn now(&self) -> i64 {
        (self.epoch.elapsed().as_nanos() / 100) as i64
    }
}

/// Simulated clock for deterministic replay: starts at `start`, and advances
/// only when `advance` is called (or by a fixed `step` per tick if
/// `advance_by_step` is used).
pub struct SimulatedTime {
    current: AtomicI64,
    step: i64,
}

impl SimulatedTime {
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            current: AtomicI64::new(start),
            step,
        }
    }

    pub fn advance(&self, delta: i64) {
        self.current.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn advance_by_step(&self) {
        self.current.fetch_add(self.step, Ordering::Relaxed);
    }
}

impl TimeProvider for SimulatedTime {
    fn now(&self) -> i64 {
        self.current.load(Ordering::Relaxed)
    }
}
