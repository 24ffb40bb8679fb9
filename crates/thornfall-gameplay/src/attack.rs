//! Timed attack state machine.
//!
//! This module provides:
//! - Attack profiles with prepare/strike/end phase boundaries
//! - A tagged attack-kind enum (melee, ranged, passive)
//! - The `Idle → Preparing → Striking → Recovering → Idle` cycle shared by
//!   the player, basic enemies and boss abilities
//! - The range-cancel rule (target fled, fast-forward to the end)

use serde::{Deserialize, Serialize};
use thornfall_common::error::AttackProfileError;

/// What an attack cycle does at its strike instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Close-range strike against the current target.
    Melee,
    /// Launches a projectile towards the target at strike time.
    Ranged {
        /// Initial projectile speed in world units per second.
        projectile_speed: f32,
    },
    /// Never strikes. Used by shield bearers whose value is their aura;
    /// the cycle idles in the preparing window and deals no damage.
    Passive,
}

impl AttackKind {
    /// Whether this kind ever applies damage.
    #[must_use]
    pub fn can_strike(&self) -> bool {
        !matches!(self, Self::Passive)
    }
}

/// Timing, reach and damage parameters for one attack cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// What happens at the strike instant.
    pub kind: AttackKind,
    /// End of the preparation window (seconds from cycle start).
    pub prepare_time: f32,
    /// Instant at which damage is applied.
    pub strike_time: f32,
    /// End of the whole cycle.
    pub end_time: f32,
    /// Maximum reach of the attack.
    pub range: f32,
    /// Damage dealt at the strike instant.
    pub damage: i32,
}

impl AttackProfile {
    /// Creates a validated attack profile.
    ///
    /// Phase boundaries must be strictly increasing and the range positive.
    pub fn new(
        kind: AttackKind,
        prepare_time: f32,
        strike_time: f32,
        end_time: f32,
        range: f32,
        damage: i32,
    ) -> Result<Self, AttackProfileError> {
        if !(prepare_time < strike_time && strike_time < end_time) {
            return Err(AttackProfileError::NonMonotonicPhases {
                prepare: prepare_time,
                strike: strike_time,
                end: end_time,
            });
        }
        if range <= 0.0 {
            return Err(AttackProfileError::NonPositiveRange(range));
        }
        Ok(Self {
            kind,
            prepare_time,
            strike_time,
            end_time,
            range,
            damage,
        })
    }

    /// Standard enemy melee swing: 0.5s windup, strike, 0.3s recovery.
    #[must_use]
    pub fn simple_melee(range: f32, damage: i32) -> Self {
        Self {
            kind: AttackKind::Melee,
            prepare_time: 0.5,
            strike_time: 1.0,
            end_time: 1.3,
            range,
            damage,
        }
    }

    /// Distance at which an enemy commits to attacking rather than chasing.
    #[must_use]
    pub fn engage_range(&self) -> f32 {
        self.range / 2.0
    }
}

/// Phase of an attack cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPhase {
    /// No cycle running.
    Idle,
    /// Winding up, no effect yet.
    Preparing,
    /// Damage window.
    Striking,
    /// Swing follow-through, no effect.
    Recovering,
}

/// Outcome of advancing an attack cycle by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackTick {
    /// Nothing of note happened this tick.
    Running,
    /// The strike instant passed: apply the profile's damage exactly once.
    Strike,
    /// The cycle finished (completed or range-cancelled) and is idle again.
    Finished,
}

/// Per-attacker attack cycle state.
///
/// The timer increases monotonically while attacking and resets to zero on
/// each (re)start. Exactly one strike fires per cycle, latched by `damaged`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackState {
    is_attacking: bool,
    timer: f32,
    damaged: bool,
}

impl AttackState {
    /// Creates an idle attack state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a cycle is currently running.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.is_attacking
    }

    /// Elapsed time since the current cycle started.
    #[must_use]
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Current phase relative to a profile.
    #[must_use]
    pub fn phase(&self, profile: &AttackProfile) -> AttackPhase {
        if !self.is_attacking {
            AttackPhase::Idle
        } else if self.timer < profile.prepare_time {
            AttackPhase::Preparing
        } else if self.timer < profile.strike_time {
            AttackPhase::Striking
        } else {
            AttackPhase::Recovering
        }
    }

    /// Starts a new cycle. Only effective from idle.
    ///
    /// Returns whether the cycle actually started.
    pub fn start(&mut self) -> bool {
        if self.is_attacking {
            return false;
        }
        self.is_attacking = true;
        self.timer = 0.0;
        self.damaged = false;
        true
    }

    /// Advances the cycle and reports what happened.
    ///
    /// `target_distance` is the current distance to the recorded target, if
    /// any. If the target has moved beyond the profile's range before the
    /// cycle ends, the timer fast-forwards to `end_time` and the remaining
    /// phases (including the strike) are skipped.
    ///
    /// Attack-speed scaling is the caller's concern: pass a pre-scaled
    /// `dt` for attackers with a speed multiplier.
    pub fn advance(
        &mut self,
        dt: f32,
        profile: &AttackProfile,
        target_distance: Option<f32>,
    ) -> AttackTick {
        if !self.is_attacking {
            return AttackTick::Finished;
        }

        self.timer += dt;

        // Range-cancel: the target fled, give up without dealing damage.
        if self.timer < profile.end_time {
            if let Some(distance) = target_distance {
                if distance > profile.range {
                    self.timer = profile.end_time;
                }
            }
        }

        if self.timer >= profile.end_time {
            self.is_attacking = false;
            return AttackTick::Finished;
        }

        if self.timer >= profile.prepare_time
            && self.timer < profile.strike_time
            && !self.damaged
            && profile.kind.can_strike()
        {
            self.damaged = true;
            return AttackTick::Strike;
        }

        AttackTick::Running
    }
}
