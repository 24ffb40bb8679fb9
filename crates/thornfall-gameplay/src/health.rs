//! Entity health and damage model.
//!
//! This module provides:
//! - Hitpoints with a monotonic death flag
//! - A newest-first damage log for floating damage numbers
//! - Display-lifetime pruning driven by simulation time

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How long a damage-log entry stays visible, in seconds.
pub const DAMAGE_DISPLAY_LIFETIME: f64 = 1.5;

/// A single logged hit, kept only for transient damage-number display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    /// Amount of damage dealt
    pub amount: i32,
    /// Simulation time at which the hit landed
    pub timestamp: f64,
}

/// Health component shared by the player, enemies and bosses.
///
/// Hitpoints are signed and never clamped at the representation level; the
/// `dead` flag derives from the sign once and never reverts. Any display
/// clamping is a renderer concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Current hitpoints (may go negative on overkill)
    pub hitpoints: i32,
    /// Maximum hitpoints
    pub max_hitpoints: i32,
    dead: bool,
    damage_log: VecDeque<DamageRecord>,
}

impl Health {
    /// Creates a health component at full hitpoints.
    #[must_use]
    pub fn new(max_hitpoints: i32) -> Self {
        Self {
            hitpoints: max_hitpoints,
            max_hitpoints,
            dead: false,
            damage_log: VecDeque::new(),
        }
    }

    /// Whether this entity has died. Monotonic: once set it never clears.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Hitpoints as a fraction of maximum, clamped for display.
    #[must_use]
    pub fn percent(&self) -> f32 {
        if self.max_hitpoints <= 0 {
            0.0
        } else {
            (self.hitpoints as f32 / self.max_hitpoints as f32).clamp(0.0, 1.0)
        }
    }

    /// Applies damage and logs it at the given simulation time.
    ///
    /// Pushes the hit to the front of the damage log (newest first) and
    /// sets the death flag when hitpoints drop to zero or below.
    pub fn damage(&mut self, amount: i32, now: f64) {
        self.hitpoints -= amount;
        self.damage_log.push_front(DamageRecord {
            amount,
            timestamp: now,
        });
        if self.hitpoints <= 0 {
            self.dead = true;
        }
    }

    /// Heals up to the maximum. Dead entities do not regenerate.
    pub fn heal(&mut self, amount: i32) {
        if self.dead {
            return;
        }
        self.hitpoints = (self.hitpoints + amount).min(self.max_hitpoints);
    }

    /// Changes the maximum, capping current hitpoints at the new value.
    pub fn set_max(&mut self, max_hitpoints: i32) {
        self.max_hitpoints = max_hitpoints;
        if !self.dead {
            self.hitpoints = self.hitpoints.min(max_hitpoints);
        }
    }

    /// Recent hits, newest first.
    #[must_use]
    pub fn damage_log(&self) -> impl Iterator<Item = &DamageRecord> {
        self.damage_log.iter()
    }

    /// Drops log entries older than the display lifetime.
    ///
    /// The log is ordered newest-first, so expired entries are a suffix.
    pub fn prune_damage_log(&mut self, now: f64) {
        while let Some(oldest) = self.damage_log.back() {
            if now - oldest.timestamp > DAMAGE_DISPLAY_LIFETIME {
                self.damage_log.pop_back();
            } else {
                break;
            }
        }
    }
}
