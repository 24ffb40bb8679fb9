//! Player state: health, melee profile, derived stats and waypoints.
//!
//! The player is a composition of components rather than a class chain:
//! a [`Health`] block, an [`AttackState`] cycle, progression, and a set of
//! acquired upgrade ids from which the derived stats are recomputed.

use ahash::AHashSet;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thornfall_common::ids::UpgradeId;
use tracing::debug;

use crate::attack::{AttackKind, AttackProfile, AttackState};
use crate::combat::in_attack_cone;
use crate::health::Health;
use crate::progression::Progression;
use crate::time::SimClock;
use crate::upgrades::UpgradeTree;

/// Base maximum hitpoints before upgrades.
pub const BASE_MAX_HP: i32 = 100;
/// Base attack damage before upgrades.
pub const BASE_DAMAGE: i32 = 15;
/// Base heal per second before upgrades.
pub const BASE_HEAL: i32 = 5;
/// Player melee reach.
pub const ATTACK_RANGE: f32 = 100.0;

/// Stats recomputed from base values plus acquired upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    /// Maximum hitpoints.
    pub max_hitpoints: i32,
    /// Passive heal per simulated second.
    pub heal_speed: i32,
    /// Damage per strike.
    pub attack_damage: i32,
    /// Attack-speed multiplier applied to the cycle timer.
    pub attack_speed: f32,
}

impl Default for DerivedStats {
    fn default() -> Self {
        Self {
            max_hitpoints: BASE_MAX_HP,
            heal_speed: BASE_HEAL,
            attack_damage: BASE_DAMAGE,
            attack_speed: 1.0,
        }
    }
}

/// A named waypoint marker fed to the quest/map UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goto {
    /// Marker identifier.
    pub idf: String,
    /// Marker position in world coordinates.
    pub position: Vec2,
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Position in world coordinates; the driver moves it.
    pub position: Vec2,
    /// Facing direction, kept unit-length.
    pub direction: Vec2,
    /// Health block.
    pub health: Health,
    /// Melee attack cycle.
    pub attack: AttackState,
    /// XP, points and the leveling curve.
    pub progression: Progression,
    stats: DerivedStats,
    acquired: AHashSet<UpgradeId>,
    gotos: Vec<Goto>,
    last_heal: f64,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    /// Creates a fresh player at the origin with base stats.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            direction: Vec2::new(1.0, 0.0),
            health: Health::new(BASE_MAX_HP),
            attack: AttackState::new(),
            progression: Progression::new(),
            stats: DerivedStats::default(),
            acquired: AHashSet::new(),
            gotos: Vec::new(),
            last_heal: 0.0,
        }
    }

    /// Current derived stats.
    #[must_use]
    pub fn stats(&self) -> DerivedStats {
        self.stats
    }

    /// Acquired upgrade ids (read-only).
    #[must_use]
    pub fn acquired_upgrades(&self) -> &AHashSet<UpgradeId> {
        &self.acquired
    }

    /// The player's melee profile built from current derived stats.
    ///
    /// Attack speed is applied by scaling the cycle timer, so the profile
    /// itself keeps fixed phase boundaries.
    #[must_use]
    pub fn attack_profile(&self) -> AttackProfile {
        AttackProfile {
            kind: AttackKind::Melee,
            prepare_time: 0.1,
            strike_time: 0.3,
            end_time: 0.5,
            range: ATTACK_RANGE,
            damage: self.stats.attack_damage,
        }
    }

    /// Forward-cone eligibility test against a target position.
    #[must_use]
    pub fn can_attack(&self, target_pos: Vec2) -> bool {
        in_attack_cone(self.position, self.direction, ATTACK_RANGE, target_pos)
    }

    /// Passive heal, once per simulated second.
    pub fn update(&mut self, clock: &SimClock) {
        while clock.now() - self.last_heal >= 1.0 {
            self.health.heal(self.stats.heal_speed);
            self.last_heal += 1.0;
        }
        self.health.prune_damage_log(clock.now());
    }

    /// Grants XP through the leveling loop.
    pub fn gain_xp(&mut self, amount: i32) {
        self.progression.gain_xp(amount);
    }

    /// Attempts to purchase an upgrade; recomputes stats on success.
    pub fn purchase(&mut self, tree: &UpgradeTree, id: UpgradeId) -> bool {
        if !tree.purchase(id, &mut self.acquired, &mut self.progression) {
            return false;
        }
        self.update_stats(tree);
        true
    }

    /// Recomputes derived stats from base values plus acquired upgrades.
    ///
    /// Each stat combines commutatively (sums and running products), and
    /// the fold iterates ids in sorted order, so the outcome is identical
    /// for any acquisition order. The multiplicative damage bonus applies
    /// once, after all flat bonuses.
    pub fn update_stats(&mut self, tree: &UpgradeTree) {
        let mut stats = DerivedStats::default();
        let mut damage_mult = 1.0f32;
        let mut flat_damage = 0i32;

        let mut ids: Vec<UpgradeId> = self.acquired.iter().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let Some(upgrade) = tree.get(id) else {
                continue;
            };
            stats.max_hitpoints += upgrade.hp_bonus;
            stats.heal_speed += upgrade.heal_bonus;
            damage_mult *= upgrade.damage_mult;
            flat_damage += upgrade.damage_add;
            stats.attack_speed *= upgrade.attack_speed_mult;
        }

        stats.attack_damage = ((BASE_DAMAGE + flat_damage) as f32 * damage_mult) as i32;
        self.health.set_max(stats.max_hitpoints);
        debug!(?stats, "player stats recomputed");
        self.stats = stats;
    }

    /// Adds a waypoint marker.
    pub fn add_goto(&mut self, goto: Goto) {
        self.gotos.push(goto);
    }

    /// Removes a waypoint by identifier. Returns whether one was removed.
    pub fn remove_goto(&mut self, idf: &str) -> bool {
        let before = self.gotos.len();
        self.gotos.retain(|goto| goto.idf != idf);
        self.gotos.len() != before
    }

    /// Current waypoint markers (read-only).
    #[must_use]
    pub fn gotos(&self) -> &[Goto] {
        &self.gotos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tree() -> UpgradeTree {
        UpgradeTree::standard().expect("valid catalog")
    }

    fn player_with_points(points: i32) -> Player {
        let mut player = Player::new();
        player.progression.points = points;
        player
    }

    #[test]
    fn test_base_stats() {
        let player = Player::new();
        assert_eq!(player.stats().max_hitpoints, BASE_MAX_HP);
        assert_eq!(player.stats().attack_damage, BASE_DAMAGE);
        assert_eq!(player.stats().heal_speed, BASE_HEAL);
        assert_eq!(player.stats().attack_speed, 1.0);
    }

    #[test]
    fn test_purchase_updates_stats() {
        let tree = tree();
        let mut player = player_with_points(5);

        assert!(player.purchase(&tree, UpgradeId::new(1)));
        assert_eq!(player.stats().max_hitpoints, BASE_MAX_HP + 100);
        assert_eq!(player.health.max_hitpoints, BASE_MAX_HP + 100);
    }

    #[test]
    fn test_damage_fold_flat_then_mult() {
        let tree = tree();
        let mut player = player_with_points(10);

        // 201 (x1.2) then 210 (+10): damage = (15 + 10) * 1.2 = 30.
        assert!(player.purchase(&tree, UpgradeId::new(201)));
        assert!(player.purchase(&tree, UpgradeId::new(210)));
        assert_eq!(player.stats().attack_damage, 30);
    }

    #[test]
    fn test_rejected_purchase_keeps_stats() {
        let tree = tree();
        let mut player = player_with_points(0);
        let before = player.stats();

        assert!(!player.purchase(&tree, UpgradeId::new(1)));
        assert_eq!(player.stats(), before);
        assert!(player.acquired_upgrades().is_empty());
    }

    #[test]
    fn test_passive_heal_once_per_second() {
        let mut player = Player::new();
        player.health.damage(50, 0.0);
        assert!(!player.health.is_dead());

        let mut clock = SimClock::new();
        clock.advance(0.5);
        player.update(&clock);
        assert_eq!(player.health.hitpoints, 50);

        clock.advance(0.5);
        player.update(&clock);
        assert_eq!(player.health.hitpoints, 50 + BASE_HEAL);

        // Three more simulated seconds, three more ticks.
        clock.advance(3.0);
        player.update(&clock);
        assert_eq!(player.health.hitpoints, 50 + 4 * BASE_HEAL);
    }

    #[test]
    fn test_gotos_add_remove() {
        let mut player = Player::new();
        player.add_goto(Goto {
            idf: "village".into(),
            position: Vec2::new(100.0, 200.0),
        });
        assert_eq!(player.gotos().len(), 1);
        assert!(player.remove_goto("village"));
        assert!(!player.remove_goto("village"));
        assert!(player.gotos().is_empty());
    }

    #[test]
    fn test_can_attack_uses_facing_cone() {
        let mut player = Player::new();
        player.direction = Vec2::new(1.0, 0.0);

        assert!(player.can_attack(Vec2::new(50.0, 0.0)));
        assert!(!player.can_attack(Vec2::new(-50.0, 0.0)));
        assert!(!player.can_attack(Vec2::new(500.0, 0.0)));
    }

    proptest! {
        #[test]
        fn prop_update_stats_order_independent(seed in 0u64..1000) {
            let tree = tree();
            let ids = [1u32, 2, 101, 201, 202, 210, 220];

            // Acquire in a shuffled order; derived stats must not care.
            let mut shuffled: Vec<u32> = ids.to_vec();
            let mut rng = fastrand::Rng::with_seed(seed);
            rng.shuffle(&mut shuffled);

            let mut reference = player_with_points(100);
            for id in ids {
                reference.acquired.insert(UpgradeId::new(id));
            }
            reference.update_stats(&tree);

            let mut permuted = player_with_points(100);
            for id in shuffled {
                permuted.acquired.insert(UpgradeId::new(id));
            }
            permuted.update_stats(&tree);

            prop_assert_eq!(reference.stats(), permuted.stats());
        }
    }
}
