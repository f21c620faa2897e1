//! Phase timing for the step loop.
//!
//! `ProfilerScope` reports its lifetime at `trace` level when dropped;
//! `PhaseTimings` accumulates wall time per phase over a whole run.

use std::time::{Duration, Instant};
use tracing::trace;

/// The four phases of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Collision,
    Exchange,
    Streaming,
    Boundary,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Collision,
        Phase::Exchange,
        Phase::Streaming,
        Phase::Boundary,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Phase::Collision => "collision",
            Phase::Exchange => "exchange",
            Phase::Streaming => "streaming",
            Phase::Boundary => "boundary",
        }
    }
}

/// A profiling scope that measures elapsed time using RAII.
///
/// The elapsed time is traced when the scope is dropped.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Creates a new profiling scope.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Gets elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        trace!(scope = self.name, elapsed_ms = self.elapsed_ms(), "scope finished");
    }
}

/// Accumulated wall time per phase
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseTimings {
    totals: [Duration; 4],
}

impl PhaseTimings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, charging its wall time to `phase`
    pub fn time<T>(&mut self, phase: Phase, f: impl FnOnce() -> T) -> T {
        let scope = ProfilerScope::new(phase.name());
        let out = f();
        self.totals[phase as usize] += scope.start.elapsed();
        out
    }

    #[must_use]
    pub fn total(&self, phase: Phase) -> Duration {
        self.totals[phase as usize]
    }

    /// Fold another worker's timings into this one
    pub fn merge(&mut self, other: &PhaseTimings) {
        for (mine, theirs) in self.totals.iter_mut().zip(other.totals) {
            *mine += theirs;
        }
    }
}
