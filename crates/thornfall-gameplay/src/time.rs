//! Simulation time.
//!
//! The core never reads the wall clock. All timestamps (damage-log entries,
//! boss emitter cooldowns, heal ticks) come from a [`SimClock`] advanced
//! only by the per-frame delta the driver supplies, so a fixed tick
//! sequence replays deterministically.

use serde::{Deserialize, Serialize};

/// Accumulated simulation time in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    elapsed: f64,
}

impl SimClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock by a frame delta.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += f64::from(dt.max(0.0));
    }

    /// Current simulation time in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.elapsed
    }

    /// Seconds elapsed since an earlier timestamp.
    #[must_use]
    pub fn since(&self, timestamp: f64) -> f64 {
        self.elapsed - timestamp
    }
}
