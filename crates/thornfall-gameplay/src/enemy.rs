//! Enemies: archetype stat table, per-enemy state and projectiles.
//!
//! Five archetypes (`tp` 0..=4) with fixed stats. Two carry passive
//! abilities instead of plain melee: the skirmisher launches projectiles at
//! its strike instant, and the shield bearer never strikes at all — its
//! value is the damage-reduction aura it grants nearby allies while alive.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thornfall_common::ids::{ArchetypeId, EntityId};

use crate::attack::{AttackKind, AttackProfile, AttackState};
use crate::health::Health;

/// Number of enemy archetypes in the fixed table.
pub const ARCHETYPE_COUNT: u8 = 5;

/// Fixed stats for one enemy archetype. Static configuration, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyArchetype {
    /// Archetype index (0..=4).
    pub tp: ArchetypeId,
    /// Display name.
    pub name: &'static str,
    /// Starting hitpoints.
    pub max_hitpoints: i32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// XP granted to the killer on removal.
    pub kill_xp_reward: i32,
    /// Attack cycle parameters.
    pub attack: AttackProfile,
    /// Grants the damage-reduction aura to the crowd while alive.
    pub shield_aura: bool,
}

/// Looks up the fixed stat table. Indices wrap at [`ARCHETYPE_COUNT`].
#[must_use]
pub fn archetype(tp: ArchetypeId) -> EnemyArchetype {
    let tp = ArchetypeId::new(tp.raw() % ARCHETYPE_COUNT);
    match tp.raw() {
        // Grunt: the baseline chaser.
        0 => EnemyArchetype {
            tp,
            name: "grunt",
            max_hitpoints: 100,
            speed: 128.0,
            kill_xp_reward: 10,
            attack: AttackProfile::simple_melee(128.0, 5),
            shield_aura: false,
        },
        // Brute: slow, hits hard.
        1 => EnemyArchetype {
            tp,
            name: "brute",
            max_hitpoints: 300,
            speed: 80.0,
            kill_xp_reward: 25,
            attack: AttackProfile {
                kind: AttackKind::Melee,
                prepare_time: 0.8,
                strike_time: 1.4,
                end_time: 1.8,
                range: 140.0,
                damage: 20,
            },
            shield_aura: false,
        },
        // Stalker: fast, fragile.
        2 => EnemyArchetype {
            tp,
            name: "stalker",
            max_hitpoints: 60,
            speed: 200.0,
            kill_xp_reward: 15,
            attack: AttackProfile {
                kind: AttackKind::Melee,
                prepare_time: 0.3,
                strike_time: 0.6,
                end_time: 0.8,
                range: 110.0,
                damage: 8,
            },
            shield_aura: false,
        },
        // Skirmisher: keeps distance, no melee.
        3 => EnemyArchetype {
            tp,
            name: "skirmisher",
            max_hitpoints: 80,
            speed: 110.0,
            kill_xp_reward: 20,
            attack: AttackProfile {
                kind: AttackKind::Ranged {
                    projectile_speed: 260.0,
                },
                prepare_time: 0.6,
                strike_time: 1.0,
                end_time: 1.4,
                range: 320.0,
                damage: 7,
            },
            shield_aura: false,
        },
        // Shield bearer: passive only, never strikes.
        _ => EnemyArchetype {
            tp,
            name: "shield bearer",
            max_hitpoints: 250,
            speed: 90.0,
            kill_xp_reward: 30,
            attack: AttackProfile {
                kind: AttackKind::Passive,
                prepare_time: 0.5,
                strike_time: 1.0,
                end_time: 1.3,
                range: 128.0,
                damage: 0,
            },
            shield_aura: true,
        },
    }
}

/// A live enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Unique id.
    pub id: EntityId,
    /// Archetype index.
    pub tp: ArchetypeId,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Health block.
    pub health: Health,
    /// Movement speed.
    pub speed: f32,
    /// XP granted on removal.
    pub kill_xp_reward: i32,
    /// Attack cycle parameters.
    pub profile: AttackProfile,
    /// Attack cycle state.
    pub attack: AttackState,
    /// Whether this enemy carries the crowd aura.
    pub shield_aura: bool,
}

impl Enemy {
    /// Spawns an enemy of an archetype at a position.
    #[must_use]
    pub fn spawn(tp: ArchetypeId, position: Vec2) -> Self {
        let stats = archetype(tp);
        Self {
            id: EntityId::new(),
            tp: stats.tp,
            position,
            health: Health::new(stats.max_hitpoints),
            speed: stats.speed,
            kill_xp_reward: stats.kill_xp_reward,
            profile: stats.attack,
            attack: AttackState::new(),
            shield_aura: stats.shield_aura,
        }
    }
}

/// An enemy projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Current position.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Damage on contact.
    pub damage: i32,
    /// Hit radius.
    pub radius: f32,
    /// Seconds of flight remaining.
    pub ttl: f32,
}

impl Projectile {
    /// Creates a projectile aimed along a direction.
    #[must_use]
    pub fn new(position: Vec2, direction: Vec2, speed: f32, damage: i32) -> Self {
        Self {
            position,
            velocity: direction * speed,
            damage,
            radius: 8.0,
            ttl: 3.0,
        }
    }

    /// Advances the projectile.
    pub fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.ttl -= dt;
    }

    /// Whether the projectile is still in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.ttl > 0.0
    }
}
