//! Enemy population maintenance.
//!
//! A [`SpawnPolicy`] decides how many enemies should exist; the [`Spawner`]
//! tops the roster back up to that number each tick with seeded random
//! placement, keeping new arrivals away from the player.

use glam::Vec2;
use std::fmt;
use thornfall_common::ids::ArchetypeId;
use tracing::debug;

use crate::enemy::{Enemy, ARCHETYPE_COUNT};

/// Placement attempts per enemy before giving up on the distance rule.
const PLACEMENT_ATTEMPTS: u32 = 8;

/// Decides the target enemy population for the current game state.
pub trait SpawnPolicy: fmt::Debug {
    /// Population the spawner should maintain given the number of upgrades
    /// the player has acquired.
    fn target_population(&self, acquired_upgrades: usize) -> usize;
}

/// Fixed base population, growing with each acquired upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPopulation {
    /// Population before any upgrades.
    pub base: usize,
    /// Extra enemies per acquired upgrade.
    pub per_upgrade: usize,
}

impl Default for FixedPopulation {
    fn default() -> Self {
        Self {
            base: 100,
            per_upgrade: 10,
        }
    }
}

impl SpawnPolicy for FixedPopulation {
    fn target_population(&self, acquired_upgrades: usize) -> usize {
        self.base + self.per_upgrade * acquired_upgrades
    }
}

/// Axis-aligned spawn region in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBounds {
    /// Bottom-left corner.
    pub origin: Vec2,
    /// Width in world units.
    pub width: f32,
    /// Height in world units.
    pub height: f32,
}

/// Tops the enemy roster back up to the policy's target each tick.
#[derive(Debug)]
pub struct Spawner {
    policy: Box<dyn SpawnPolicy + Send + Sync>,
    bounds: SpawnBounds,
    min_player_distance: f32,
    rng: fastrand::Rng,
}

impl Spawner {
    /// Creates a spawner with a seeded RNG for reproducible placement.
    #[must_use]
    pub fn new(
        policy: Box<dyn SpawnPolicy + Send + Sync>,
        bounds: SpawnBounds,
        seed: u64,
    ) -> Self {
        Self {
            policy,
            bounds,
            min_player_distance: 200.0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Overrides the minimum spawn distance from the player.
    #[must_use]
    pub fn with_min_player_distance(mut self, distance: f32) -> Self {
        self.min_player_distance = distance;
        self
    }

    /// The population target for the current state.
    #[must_use]
    pub fn target_population(&self, acquired_upgrades: usize) -> usize {
        self.policy.target_population(acquired_upgrades)
    }

    /// Spawns enemies until the roster meets the policy target.
    ///
    /// Returns the number spawned. Placement retries a few times to stay
    /// outside `min_player_distance`, then accepts the last candidate so a
    /// small spawn region cannot stall the top-up.
    pub fn maintain(
        &mut self,
        enemies: &mut Vec<Enemy>,
        player_pos: Vec2,
        acquired_upgrades: usize,
    ) -> usize {
        let target = self.policy.target_population(acquired_upgrades);
        let mut spawned = 0;
        while enemies.len() < target {
            let tp = ArchetypeId::new(self.rng.u8(0..ARCHETYPE_COUNT));
            let position = self.place(player_pos);
            enemies.push(Enemy::spawn(tp, position));
            spawned += 1;
        }
        if spawned > 0 {
            debug!(spawned, population = enemies.len(), "roster topped up");
        }
        spawned
    }

    fn place(&mut self, player_pos: Vec2) -> Vec2 {
        let mut candidate = self.random_point();
        for _ in 0..PLACEMENT_ATTEMPTS {
            if candidate.distance(player_pos) >= self.min_player_distance {
                break;
            }
            candidate = self.random_point();
        }
        candidate
    }

    fn random_point(&mut self) -> Vec2 {
        Vec2::new(
            self.bounds.origin.x + self.rng.f32() * self.bounds.width,
            self.bounds.origin.y + self.rng.f32() * self.bounds.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> SpawnBounds {
        SpawnBounds {
            origin: Vec2::new(-1000.0, -1000.0),
            width: 2000.0,
            height: 2000.0,
        }
    }

    fn spawner(base: usize) -> Spawner {
        Spawner::new(
            Box::new(FixedPopulation {
                base,
                per_upgrade: 0,
            }),
            bounds(),
            42,
        )
    }

    #[test]
    fn test_maintain_reaches_target() {
        let mut spawner = spawner(10);
        let mut enemies = Vec::new();
        let spawned = spawner.maintain(&mut enemies, Vec2::ZERO, 0);
        assert_eq!(spawned, 10);
        assert_eq!(enemies.len(), 10);
    }

    #[test]
    fn test_maintain_is_idempotent_at_target() {
        let mut spawner = spawner(5);
        let mut enemies = Vec::new();
        spawner.maintain(&mut enemies, Vec2::ZERO, 0);
        let spawned = spawner.maintain(&mut enemies, Vec2::ZERO, 0);
        assert_eq!(spawned, 0);
        assert_eq!(enemies.len(), 5);
    }

    #[test]
    fn test_population_scales_with_upgrades() {
        let policy = FixedPopulation {
            base: 100,
            per_upgrade: 10,
        };
        assert_eq!(policy.target_population(0), 100);
        assert_eq!(policy.target_population(3), 130);
    }

    #[test]
    fn test_spawns_inside_bounds() {
        let mut spawner = spawner(50);
        let mut enemies = Vec::new();
        spawner.maintain(&mut enemies, Vec2::ZERO, 0);
        for enemy in &enemies {
            assert!(enemy.position.x >= -1000.0 && enemy.position.x <= 1000.0);
            assert!(enemy.position.y >= -1000.0 && enemy.position.y <= 1000.0);
        }
    }

    #[test]
    fn test_seeded_placement_is_reproducible() {
        let mut first = spawner(20);
        let mut second = spawner(20);
        let mut a = Vec::new();
        let mut b = Vec::new();
        first.maintain(&mut a, Vec2::ZERO, 0);
        second.maintain(&mut b, Vec2::ZERO, 0);
        for (left, right) in a.iter().zip(&b) {
            assert_eq!(left.position, right.position);
            assert_eq!(left.tp, right.tp);
        }
    }
}
