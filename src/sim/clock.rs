//! Relative time sources
//!
//! Generators, treasure lifetimes and chaser re-aim timers all read the same
//! millisecond clock. The world owns it and samples it once per tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic millisecond clock
pub trait Clock: Send {
    /// Milliseconds since the clock's origin
    fn now_ms(&self) -> u64;

    /// Called by the world at the start of every tick
    fn tick(&mut self) {}
}

/// Advances by a fixed step per tick; fully deterministic
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    now: u64,
    step: u64,
}

impl FixedStepClock {
    pub fn new(step_ms: u64) -> Self {
        Self { now: 0, step: step_ms }
    }
}

impl Clock for FixedStepClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn tick(&mut self) {
        self.now += self.step;
    }
}

/// Wall-clock time since construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Externally driven clock for tests; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
