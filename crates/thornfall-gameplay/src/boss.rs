//! Multi-phase boss fight controller.
//!
//! The boss cycles through randomly chosen phases:
//! - **Shield** (6s): the boss is damage-immune while four rotating
//!   lightning beams sweep the arena
//! - **Wait** (3s): a recovery window where the boss is vulnerable
//! - **Projectile** (10s): accelerating balls launched at the player on a
//!   fixed cadence
//!
//! On death the boss plays a growing death effect; once it has covered the
//! arena the fight reports `ready_to_hide` and the driver can tear the
//! encounter down.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use thornfall_common::ids::EntityId;
use thornfall_common::math::{normalize_or_zero, triangle_area, EPS};
use tracing::{debug, trace};

use crate::health::Health;
use crate::player::Player;
use crate::time::SimClock;

/// Shield phase length in seconds.
pub const SHIELD_PHASE_DURATION: f32 = 6.0;
/// Wait phase length in seconds.
pub const WAIT_PHASE_DURATION: f32 = 3.0;
/// Projectile phase length in seconds.
pub const PROJECTILE_PHASE_DURATION: f32 = 10.0;
/// Seconds between ball launches during the projectile phase.
pub const BALL_SPAWN_INTERVAL: f32 = 0.5;
/// Damage dealt by a lightning beam hit.
pub const LIGHTNING_DAMAGE: i32 = 50;
/// Per-beam cooldown between hits on the player, in simulated seconds.
pub const LIGHTNING_DAMAGE_COOLDOWN: f64 = 0.2;
/// Beam proximity threshold: area of the player/boss/beam-tip triangle.
pub const LIGHTNING_HIT_AREA: f32 = 10.0;
/// Contact radius credited to the player for ball hits.
pub const PLAYER_CONTACT_RADIUS: f32 = 24.0;

/// Which attack pattern the boss is currently running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Between phases; the next one is chosen on the following tick.
    #[default]
    None,
    /// Damage-immune, sweeping lightning beams.
    Shield,
    /// Idle recovery window.
    Wait,
    /// Launching accelerating balls.
    Projectile,
}

/// One rotating lightning beam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lightning {
    /// Current absolute beam angle in radians.
    pub rot: f32,
    rot_offset: f32,
    last_damage: f64,
}

impl Lightning {
    fn new(rot_offset: f32) -> Self {
        Self {
            rot: rot_offset,
            rot_offset,
            last_damage: f64::NEG_INFINITY,
        }
    }

    /// Unit direction of the beam.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.rot.cos(), self.rot.sin())
    }
}

/// An accelerating projectile launched at the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Current position.
    pub position: Vec2,
    /// Unit flight direction, fixed at launch.
    pub direction: Vec2,
    /// Current speed in world units per second.
    pub speed: f32,
    /// Hit radius; smaller balls hit harder.
    pub radius: f32,
    /// Cleared on contact or when the ball leaves the arena.
    pub visible: bool,
}

impl Ball {
    /// Contact damage: a flat base plus a bonus inversely proportional to
    /// the radius.
    #[must_use]
    pub fn contact_damage(&self) -> i32 {
        50 + (500.0 / self.radius.max(EPS)) as i32
    }
}

/// The boss encounter state machine.
///
/// The RNG is skipped by serde; a restored encounter reseeds from entropy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossFight {
    /// Unique id.
    pub id: EntityId,
    /// Boss position; fixed for the duration of the fight.
    pub position: Vec2,
    /// Health block.
    pub health: Health,
    /// XP granted to the player when the boss dies.
    pub kill_xp_reward: i32,
    phase: BossPhase,
    phase_timer: f32,
    shield_active: bool,
    lightnings: Vec<Lightning>,
    balls: Vec<Ball>,
    since_last_ball: f32,
    arena_radius: f32,
    #[serde(skip)]
    rng: fastrand::Rng,
    death_timer: f32,
    reward_granted: bool,
    ready_to_hide: bool,
}

impl BossFight {
    /// Creates a boss at a position with an arena radius bounding its
    /// projectiles and death effect.
    #[must_use]
    pub fn new(position: Vec2, max_hitpoints: i32, arena_radius: f32, seed: u64) -> Self {
        Self {
            id: EntityId::new(),
            position,
            health: Health::new(max_hitpoints),
            kill_xp_reward: 500,
            phase: BossPhase::None,
            phase_timer: 0.0,
            shield_active: false,
            lightnings: Vec::new(),
            balls: Vec::new(),
            since_last_ball: 0.0,
            arena_radius,
            rng: fastrand::Rng::with_seed(seed),
            death_timer: 0.0,
            reward_granted: false,
            ready_to_hide: false,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    /// Whether the shield is up (the boss ignores damage while it is).
    #[must_use]
    pub fn is_shield_active(&self) -> bool {
        self.shield_active
    }

    /// Active lightning beams (empty outside the shield phase).
    #[must_use]
    pub fn lightnings(&self) -> &[Lightning] {
        &self.lightnings
    }

    /// Balls currently in flight.
    #[must_use]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Whether the death effect has finished and the encounter can be torn
    /// down.
    #[must_use]
    pub fn is_ready_to_hide(&self) -> bool {
        self.ready_to_hide
    }

    /// Radius of the growing death effect, zero while alive.
    #[must_use]
    pub fn death_effect_radius(&self) -> f32 {
        if !self.health.is_dead() {
            return 0.0;
        }
        self.death_timer.powi(4).exp()
    }

    /// Applies damage to the boss unless the shield is up.
    ///
    /// Returns whether the damage landed.
    pub fn damage(&mut self, amount: i32, now: f64) -> bool {
        if self.shield_active {
            trace!(amount, "boss shield absorbed hit");
            return false;
        }
        self.health.damage(amount, now);
        true
    }

    /// Advances the encounter by `dt` simulated seconds.
    pub fn update(&mut self, player: &mut Player, dt: f32, clock: &SimClock) {
        if self.health.is_dead() {
            self.enter_death(dt, player);
            return;
        }

        self.update_balls(player, dt, clock);

        if self.phase == BossPhase::None {
            self.pick_phase();
        }
        self.phase_timer += dt;

        match self.phase {
            BossPhase::None => {}
            BossPhase::Shield => self.update_shield(player, clock),
            BossPhase::Wait => {
                if self.phase_timer >= WAIT_PHASE_DURATION {
                    self.end_phase();
                }
            }
            BossPhase::Projectile => self.update_projectile(player, dt),
        }
    }

    fn enter_death(&mut self, dt: f32, player: &mut Player) {
        if !self.reward_granted {
            self.reward_granted = true;
            self.shield_active = false;
            self.lightnings.clear();
            self.balls.clear();
            player.gain_xp(self.kill_xp_reward);
            debug!(reward = self.kill_xp_reward, "boss defeated");
        }
        self.death_timer += dt;
        if self.death_effect_radius() > self.arena_radius * 2.0 {
            self.ready_to_hide = true;
        }
    }

    fn pick_phase(&mut self) {
        match self.rng.u8(0..3) {
            0 => self.start_shield_phase(),
            1 => self.start_phase(BossPhase::Wait),
            _ => {
                self.since_last_ball = BALL_SPAWN_INTERVAL;
                self.start_phase(BossPhase::Projectile);
            }
        }
        debug!(phase = ?self.phase, "boss phase start");
    }

    fn start_shield_phase(&mut self) {
        self.shield_active = true;
        self.lightnings = [0.0, FRAC_PI_2, FRAC_PI_4, 3.0 * FRAC_PI_4]
            .into_iter()
            .map(Lightning::new)
            .collect();
        self.start_phase(BossPhase::Shield);
    }

    fn start_phase(&mut self, phase: BossPhase) {
        self.phase = phase;
        self.phase_timer = 0.0;
    }

    fn end_phase(&mut self) {
        self.shield_active = false;
        self.lightnings.clear();
        self.phase = BossPhase::None;
        self.phase_timer = 0.0;
    }

    fn update_shield(&mut self, player: &mut Player, clock: &SimClock) {
        if self.phase_timer >= SHIELD_PHASE_DURATION {
            self.end_phase();
            return;
        }

        // One full revolution over the phase, each beam keeping its offset.
        let sweep = TAU * (self.phase_timer / SHIELD_PHASE_DURATION);
        let now = clock.now();
        for lightning in &mut self.lightnings {
            lightning.rot = sweep + lightning.rot_offset;
            if now - lightning.last_damage < LIGHTNING_DAMAGE_COOLDOWN {
                continue;
            }
            if beam_hits(self.position, lightning.direction(), self.arena_radius, player.position)
            {
                lightning.last_damage = now;
                player.health.damage(LIGHTNING_DAMAGE, now);
                trace!("lightning hit player");
            }
        }
    }

    fn update_projectile(&mut self, player: &Player, dt: f32) {
        if self.phase_timer >= PROJECTILE_PHASE_DURATION {
            self.end_phase();
            return;
        }

        self.since_last_ball += dt;
        if self.since_last_ball >= BALL_SPAWN_INTERVAL {
            self.since_last_ball = 0.0;
            let to_player = player.position - self.position;
            // Slightly perturbed aim; launch speed scales with distance so
            // far targets still get pressured.
            let jitter = (self.rng.f32() - 0.5) * 0.4;
            let direction = Vec2::from_angle(jitter).rotate(normalize_or_zero(to_player));
            self.balls.push(Ball {
                position: self.position,
                direction,
                speed: to_player.length(),
                radius: 5.0 + self.rng.f32() * 10.0,
                visible: true,
            });
        }
    }

    fn update_balls(&mut self, player: &mut Player, dt: f32, clock: &SimClock) {
        for ball in &mut self.balls {
            let boss_distance = ball.position.distance(self.position);
            ball.speed += boss_distance * dt;
            ball.position += ball.direction * ball.speed * dt;

            if ball.position.distance(player.position) <= ball.radius + PLAYER_CONTACT_RADIUS {
                player.health.damage(ball.contact_damage(), clock.now());
                ball.visible = false;
            } else if boss_distance > self.arena_radius {
                ball.visible = false;
            }
        }
        self.balls.retain(|ball| ball.visible);
    }
}

/// Corridor test for a lightning beam.
///
/// The beam is treated as a ray of `length` from `origin` along `direction`;
/// the player is hit when ahead of the origin, within the beam length, and
/// the player/origin/unit-tip triangle is thinner than
/// [`LIGHTNING_HIT_AREA`].
fn beam_hits(origin: Vec2, direction: Vec2, length: f32, target: Vec2) -> bool {
    let to_target = target - origin;
    if to_target.dot(direction) <= 0.0 {
        return false;
    }
    if to_target.length() > length {
        return false;
    }
    triangle_area(target, origin, origin + direction) < LIGHTNING_HIT_AREA
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss() -> BossFight {
        BossFight::new(Vec2::ZERO, 1000, 800.0, 7)
    }

    fn advance(fight: &mut BossFight, player: &mut Player, clock: &mut SimClock, seconds: f32) {
        let mut remaining = seconds;
        while remaining > 0.0 {
            let dt = remaining.min(1.0 / 60.0);
            clock.advance(dt);
            fight.update(player, dt, clock);
            remaining -= dt;
        }
    }

    #[test]
    fn test_phase_is_chosen_on_first_tick() {
        let mut fight = boss();
        let mut player = Player::new();
        let mut clock = SimClock::new();
        advance(&mut fight, &mut player, &mut clock, 0.1);
        assert_ne!(fight.phase(), BossPhase::None);
    }

    #[test]
    fn test_shield_blocks_damage() {
        let mut fight = boss();
        fight.shield_active = true;
        assert!(!fight.damage(100, 0.0));
        assert_eq!(fight.health.hitpoints, 1000);

        fight.shield_active = false;
        assert!(fight.damage(100, 0.0));
        assert_eq!(fight.health.hitpoints, 900);
    }

    #[test]
    fn test_shield_phase_spawns_four_beams_and_expires() {
        let mut fight = boss();
        let mut player = Player::new();
        // Far corner: out of beam reach so the player survives the sweep.
        player.position = Vec2::new(10_000.0, 10_000.0);
        let mut clock = SimClock::new();

        fight.start_shield_phase();
        assert!(fight.is_shield_active());
        assert_eq!(fight.lightnings().len(), 4);

        advance(&mut fight, &mut player, &mut clock, SHIELD_PHASE_DURATION + 0.1);
        assert!(!fight.is_shield_active());
        assert!(fight.lightnings().is_empty());
    }

    #[test]
    fn test_lightning_sweep_damages_with_cooldown() {
        let mut fight = boss();
        let mut player = Player::new();
        // On the first beam's initial heading, just outside contact range.
        player.position = Vec2::new(200.0, 0.0);
        let mut clock = SimClock::new();

        fight.start_shield_phase();
        clock.advance(1.0 / 60.0);
        fight.update(&mut player, 1.0 / 60.0, &clock);
        let hp_after_first = player.health.hitpoints;
        assert_eq!(hp_after_first, 100 - LIGHTNING_DAMAGE);

        // Within the cooldown the same beam cannot hit again.
        clock.advance(0.01);
        fight.update(&mut player, 0.01, &clock);
        assert_eq!(player.health.hitpoints, hp_after_first);
    }

    #[test]
    fn test_beam_corridor() {
        let origin = Vec2::ZERO;
        let dir = Vec2::new(1.0, 0.0);
        assert!(beam_hits(origin, dir, 800.0, Vec2::new(100.0, 1.0)));
        // Behind the origin.
        assert!(!beam_hits(origin, dir, 800.0, Vec2::new(-100.0, 0.0)));
        // Too far off-axis.
        assert!(!beam_hits(origin, dir, 800.0, Vec2::new(100.0, 50.0)));
        // Beyond the beam length.
        assert!(!beam_hits(origin, dir, 800.0, Vec2::new(900.0, 0.0)));
    }

    #[test]
    fn test_ball_damage_inverse_to_radius() {
        let small = Ball {
            position: Vec2::ZERO,
            direction: Vec2::new(1.0, 0.0),
            speed: 100.0,
            radius: 5.0,
            visible: true,
        };
        let large = Ball { radius: 15.0, ..small };
        assert_eq!(small.contact_damage(), 150);
        assert_eq!(large.contact_damage(), 83);
        assert!(small.contact_damage() > large.contact_damage());
    }

    #[test]
    fn test_ball_accelerates_and_leaves_arena() {
        let mut fight = boss();
        fight.balls.push(Ball {
            position: Vec2::new(100.0, 0.0),
            direction: Vec2::new(1.0, 0.0),
            speed: 200.0,
            radius: 10.0,
            visible: true,
        });
        let mut player = Player::new();
        player.position = Vec2::new(0.0, 5000.0);
        let clock = SimClock::new();

        fight.update_balls(&mut player, 0.1, &clock);
        let ball = fight.balls[0];
        assert!(ball.speed > 200.0);
        assert!(ball.position.x > 100.0);

        // Push it past the arena edge.
        for _ in 0..200 {
            fight.update_balls(&mut player, 0.1, &clock);
            if fight.balls.is_empty() {
                break;
            }
        }
        assert!(fight.balls.is_empty());
    }

    #[test]
    fn test_ball_contact_damages_player_once() {
        let mut fight = boss();
        fight.balls.push(Ball {
            position: Vec2::new(90.0, 0.0),
            direction: Vec2::new(1.0, 0.0),
            speed: 10.0,
            radius: 10.0,
            visible: true,
        });
        let mut player = Player::new();
        player.position = Vec2::new(100.0, 0.0);
        let clock = SimClock::new();

        fight.update_balls(&mut player, 1.0 / 60.0, &clock);
        assert!(player.health.hitpoints < 100);
        assert!(fight.balls.is_empty());
    }

    #[test]
    fn test_death_effect_grows_until_ready_to_hide() {
        let mut fight = boss();
        let mut player = Player::new();
        player.position = Vec2::new(10_000.0, 10_000.0);
        let mut clock = SimClock::new();

        fight.health.damage(2000, 0.0);
        assert!(fight.health.is_dead());

        advance(&mut fight, &mut player, &mut clock, 0.1);
        assert!(fight.balls.is_empty());
        assert!(!fight.is_shield_active());
        let early = fight.death_effect_radius();

        advance(&mut fight, &mut player, &mut clock, 2.0);
        assert!(fight.death_effect_radius() > early);
        assert!(fight.is_ready_to_hide());
    }

    #[test]
    fn test_kill_reward_granted_once() {
        let mut fight = boss();
        let mut player = Player::new();
        let mut clock = SimClock::new();

        fight.health.damage(2000, 0.0);
        advance(&mut fight, &mut player, &mut clock, 1.0);
        assert_eq!(player.progression.points, 3);
        let xp_after = player.progression.xp;

        advance(&mut fight, &mut player, &mut clock, 1.0);
        assert_eq!(player.progression.xp, xp_after);
    }
}
