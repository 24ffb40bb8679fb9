//! World tick orchestration.
//!
//! [`GameWorld`] owns the simulation clock, the player, the enemy roster,
//! projectiles in flight and an optional boss encounter, and advances them
//! in a fixed order each tick:
//!
//! 1. Clock and player upkeep
//! 2. Dead-entity removal (XP is granted here, exactly once)
//! 3. Roster top-up
//! 4. Enemy movement and attacks
//! 5. Projectiles
//! 6. Boss encounter
//! 7. Player attack resolution
//!
//! Removal runs before spawning and before any targeting so no strike or
//! projectile ever resolves against a corpse.

use glam::Vec2;
use thornfall_common::ids::{EntityId, UpgradeId};
use thornfall_common::math::normalize_or_zero;
use tracing::debug;

use crate::attack::{AttackKind, AttackTick};
use crate::boss::{BossFight, PLAYER_CONTACT_RADIUS};
use crate::combat::{mitigated_damage, Viewport};
use crate::enemy::{Enemy, Projectile};
use crate::player::Player;
use crate::spawner::Spawner;
use crate::time::SimClock;
use crate::upgrades::UpgradeTree;

/// What the player's current attack cycle is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerTarget {
    Enemy(EntityId),
    Boss,
}

/// The whole combat simulation for one play session.
#[derive(Debug)]
pub struct GameWorld {
    /// Simulation clock; advances only inside [`GameWorld::update`].
    pub clock: SimClock,
    /// The player character.
    pub player: Player,
    /// Live enemy roster.
    pub enemies: Vec<Enemy>,
    /// Enemy projectiles in flight.
    pub projectiles: Vec<Projectile>,
    /// Camera rectangle; the driver moves it with the player.
    pub viewport: Viewport,
    tree: UpgradeTree,
    spawner: Spawner,
    boss: Option<BossFight>,
    attack_held: bool,
    player_target: Option<PlayerTarget>,
}

impl GameWorld {
    /// Creates a world from an upgrade tree, a spawner and the initial
    /// viewport.
    #[must_use]
    pub fn new(tree: UpgradeTree, spawner: Spawner, viewport: Viewport) -> Self {
        Self {
            clock: SimClock::new(),
            player: Player::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            viewport,
            tree,
            spawner,
            boss: None,
            attack_held: false,
            player_target: None,
        }
    }

    /// The shared upgrade catalog.
    #[must_use]
    pub fn upgrade_tree(&self) -> &UpgradeTree {
        &self.tree
    }

    /// The active boss encounter, if any.
    #[must_use]
    pub fn boss(&self) -> Option<&BossFight> {
        self.boss.as_ref()
    }

    /// Begins a boss encounter.
    pub fn start_boss_fight(&mut self, fight: BossFight) {
        debug!(position = ?fight.position, "boss fight started");
        self.boss = Some(fight);
    }

    /// Sets whether the attack input is held this tick.
    pub fn set_attack_held(&mut self, held: bool) {
        self.attack_held = held;
    }

    /// Buys an upgrade for the player from the shared catalog.
    pub fn purchase_upgrade(&mut self, id: UpgradeId) -> bool {
        self.player.purchase(&self.tree, id)
    }

    /// Advances the whole simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.clock.advance(dt);
        let now = self.clock.now();
        self.player.update(&self.clock);

        self.cull_dead();
        self.spawner.maintain(
            &mut self.enemies,
            self.player.position,
            self.player.acquired_upgrades().len(),
        );
        self.update_enemies(dt, now);
        self.update_projectiles(dt, now);

        if let Some(fight) = &mut self.boss {
            fight.update(&mut self.player, dt, &self.clock);
            if fight.is_ready_to_hide() {
                self.boss = None;
            }
        }

        self.update_player_attack(dt, now);
    }

    /// Shield bearers currently propping up the crowd.
    #[must_use]
    pub fn active_shields(&self) -> usize {
        self.enemies
            .iter()
            .filter(|enemy| {
                enemy.shield_aura
                    && !enemy.health.is_dead()
                    && self.viewport.contains(enemy.position)
            })
            .count()
    }

    fn cull_dead(&mut self) {
        let mut reward = 0;
        self.enemies.retain(|enemy| {
            if enemy.health.is_dead() {
                reward += enemy.kill_xp_reward;
                false
            } else {
                true
            }
        });
        if reward > 0 {
            self.player.gain_xp(reward);
        }
    }

    fn update_enemies(&mut self, dt: f32, now: f64) {
        let Self {
            enemies,
            projectiles,
            player,
            viewport,
            ..
        } = self;

        for enemy in enemies.iter_mut() {
            let distance = enemy.position.distance(player.position);

            if enemy.attack.is_attacking() {
                if enemy.attack.advance(dt, &enemy.profile, Some(distance)) == AttackTick::Strike {
                    match enemy.profile.kind {
                        AttackKind::Melee => player.health.damage(enemy.profile.damage, now),
                        AttackKind::Ranged { projectile_speed } => projectiles.push(
                            Projectile::new(
                                enemy.position,
                                normalize_or_zero(player.position - enemy.position),
                                projectile_speed,
                                enemy.profile.damage,
                            ),
                        ),
                        AttackKind::Passive => {}
                    }
                }
            } else if distance <= enemy.profile.engage_range() && enemy.profile.kind.can_strike() {
                enemy.attack.start();
            } else if viewport.contains(enemy.position) {
                enemy.position +=
                    normalize_or_zero(player.position - enemy.position) * enemy.speed * dt;
            }
        }
    }

    fn update_projectiles(&mut self, dt: f32, now: f64) {
        for projectile in &mut self.projectiles {
            projectile.update(dt);
            if projectile.position.distance(self.player.position)
                <= projectile.radius + PLAYER_CONTACT_RADIUS
            {
                self.player.health.damage(projectile.damage, now);
                projectile.ttl = 0.0;
            }
        }
        self.projectiles.retain(Projectile::is_active);
    }

    fn target_position(&self) -> Option<Vec2> {
        match self.player_target? {
            PlayerTarget::Boss => self
                .boss
                .as_ref()
                .filter(|fight| !fight.health.is_dead())
                .map(|fight| fight.position),
            PlayerTarget::Enemy(id) => self
                .enemies
                .iter()
                .find(|enemy| enemy.id == id)
                .map(|enemy| enemy.position),
        }
    }

    fn update_player_attack(&mut self, dt: f32, now: f64) {
        if self.player.health.is_dead() {
            return;
        }
        let profile = self.player.attack_profile();
        let scaled_dt = dt * self.player.stats().attack_speed;

        if self.player.attack.is_attacking() {
            // A vanished target reads as infinitely far, which cancels the
            // cycle through the normal range rule.
            let target_distance = self
                .target_position()
                .map_or(f32::INFINITY, |pos| self.player.position.distance(pos));
            let tick = self
                .player
                .attack
                .advance(scaled_dt, &profile, Some(target_distance));
            if tick == AttackTick::Strike {
                let damage = mitigated_damage(profile.damage, self.active_shields());
                self.apply_player_strike(damage, now);
            }
            if !self.player.attack.is_attacking() {
                self.player_target = None;
            }
            return;
        }

        if !self.attack_held {
            return;
        }

        // Boss first, then the nearest cone-eligible enemy.
        if let Some(fight) = &self.boss {
            if !fight.health.is_dead() && self.player.can_attack(fight.position) {
                self.player_target = Some(PlayerTarget::Boss);
                self.player.attack.start();
                return;
            }
        }

        let mut nearest: Option<(EntityId, f32)> = None;
        for enemy in &self.enemies {
            if !self.player.can_attack(enemy.position) {
                continue;
            }
            let distance = self.player.position.distance(enemy.position);
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((enemy.id, distance));
            }
        }
        if let Some((id, _)) = nearest {
            self.player_target = Some(PlayerTarget::Enemy(id));
            self.player.attack.start();
        }
    }

    fn apply_player_strike(&mut self, damage: i32, now: f64) {
        match self.player_target {
            Some(PlayerTarget::Boss) => {
                if let Some(fight) = &mut self.boss {
                    fight.damage(damage, now);
                }
            }
            Some(PlayerTarget::Enemy(id)) => {
                if let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id == id) {
                    enemy.health.damage(damage, now);
                }
            }
            None => {}
        }
    }
}
