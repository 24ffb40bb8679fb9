//! Combat resolution: targeting geometry and damage mitigation.
//!
//! This module provides:
//! - The player's forward-facing attack cone test
//! - Enemy aggro/engage distance checks
//! - The shield-crowd damage mitigation curve

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thornfall_common::math::{angle_at, normalize_or_zero, EPS};

/// Forward-facing cone eligibility test.
///
/// The cone is anchored at `attacker_pos`, extends `range` along `facing`
/// and spans a 90° half-angle: a target is eligible iff it is within range
/// and on the front half relative to the facing direction. This is not a
/// plain radius check; an enemy directly behind the attacker is safe even
/// point-blank.
///
/// Degenerate geometry is handled explicitly: a zero-distance target is
/// always eligible, and a zero facing vector degrades to a radius check.
#[must_use]
pub fn in_attack_cone(attacker_pos: Vec2, facing: Vec2, range: f32, target_pos: Vec2) -> bool {
    let distance = attacker_pos.distance(target_pos);
    if distance >= range {
        return false;
    }
    if distance < EPS {
        return true;
    }

    let attack_end = attacker_pos + normalize_or_zero(facing) * range;
    let angle = angle_at(attacker_pos, attack_end, target_pos);
    angle < std::f32::consts::FRAC_PI_2
}

/// Damage multiplier applied to the player while `active_shields` shield
/// bearers are alive and in view.
///
/// `2 / (2 + N)`: identity at zero, diminishing returns as the crowd
/// grows, never reaching zero. Applied at the moment damage is dealt, not
/// stored anywhere.
#[must_use]
pub fn shield_mitigation(active_shields: usize) -> f32 {
    2.0 / (2.0 + active_shields as f32)
}

/// Applies the shield-crowd multiplier to an outgoing damage amount.
#[must_use]
pub fn mitigated_damage(base_damage: i32, active_shields: usize) -> i32 {
    (base_damage as f32 * shield_mitigation(active_shields)) as i32
}

/// Camera-aligned visibility rectangle supplied by the driver.
///
/// Enemies outside the viewport neither chase nor get counted towards the
/// shield crowd; the core treats this as the "in view" predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Bottom-left corner in world coordinates
    pub origin: Vec2,
    /// Width in world units
    pub width: f32,
    /// Height in world units
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport from its bottom-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2, width: f32, height: f32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Whether a point is inside the viewport.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        thornfall_common::math::point_in_rect(point, self.origin, self.width, self.height)
    }
}
