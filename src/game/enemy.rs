//! Bot AI
//!
//! Each bot runs a perception, movement, attack loop once per tick:
//!
//! 1. Ignore the target unless it is within detection range
//! 2. Turn toward it (yaw only, shortest arc)
//! 3. Keep between `min_distance` and `max_distance` while strafing randomly
//! 4. Shoot when it is alive, in range, off cooldown and in line of sight
//!
//! A dead target is still tracked and circled, just not shot at.
//!
//! Bots are bad shots on purpose: only `accuracy` of all shots are aimed,
//! the rest go toward a point thrown up to `miss_radius` away.

use glam::Vec3;
use serde::{Serialize, Deserialize};
use tracing::trace;

use crate::core::math::{bearing, horizontal, lerp_angle};
use crate::core::rng::DeterministicRng;
use crate::game::actor::{Actor, ActorId, ActorKind, Combatant};
use crate::game::config::EnemyConfig;
use crate::game::movement::teleport;
use crate::game::world::{HitResult, World};

/// AI memory carried between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BotBrain {
    /// Simulated time of the last shot, `None` before the first
    pub last_attack_time: Option<f64>,
    /// Current strafe value in `[-1, 1]`
    pub strafe: f32,
    /// When the strafe value is next re-rolled
    pub next_strafe_change: f64,
}

/// An AI-controlled combatant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bot {
    /// Kinematic body
    pub actor: Actor,
    /// AI state
    pub brain: BotBrain,
}

/// Outcome of a bot shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BotShot {
    /// Who fired
    pub shooter: ActorId,
    /// The roll said "aim true"
    pub aimed: bool,
    /// Raw ray result
    pub hit: HitResult,
    /// Victim the caller should kill: the target, or another bot when
    /// friendly fire is on
    pub killed: Option<ActorId>,
    /// Beam start (muzzle)
    pub beam_start: Vec3,
    /// Beam end (hit point or full range)
    pub beam_end: Vec3,
}

impl Combatant for Bot {
    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl Bot {
    /// Fresh bot at `position`; first strafe change one interval from `now`.
    pub fn new(id: ActorId, position: Vec3, config: &EnemyConfig, now: f64) -> Self {
        Self {
            actor: Actor::new(id, ActorKind::Bot, position),
            brain: BotBrain {
                last_attack_time: None,
                strafe: 0.0,
                next_strafe_change: now + config.strafe_change_interval as f64,
            },
        }
    }

    /// Check if the attack cooldown has elapsed at `now`.
    #[inline]
    pub fn can_attack(&self, config: &EnemyConfig, now: f64) -> bool {
        match self.brain.last_attack_time {
            Some(last) => now >= last + config.attack_cooldown as f64,
            None => true,
        }
    }

    /// Muzzle position.
    #[inline]
    pub fn muzzle(&self, config: &EnemyConfig) -> Vec3 {
        self.actor.position + Vec3::Y * config.muzzle_height
    }

    /// Run one tick of AI against `target`.
    ///
    /// Returns the shot if the bot fired. Kills are left to the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn think<W: World + ?Sized>(
        &mut self,
        target: &Actor,
        config: &EnemyConfig,
        world: &mut W,
        rng: &mut DeterministicRng,
        now: f64,
        dt: f32,
    ) -> Option<BotShot> {
        if self.actor.dead {
            return None;
        }

        let distance = self.actor.position.distance(target.position);
        if distance > config.detection_range {
            return None;
        }

        self.face(target.position, config, dt);
        self.steer(target.position, distance, config, world, rng, now, dt);

        if target.is_alive()
            && distance <= config.attack_range
            && self.can_attack(config, now)
            && self.has_line_of_sight(target, config, &*world)
        {
            return Some(self.attack(target, config, &*world, rng, now));
        }
        None
    }

    /// Turn toward `target` by `rotation_speed * dt` of the remaining arc.
    pub fn face(&mut self, target: Vec3, config: &EnemyConfig, dt: f32) {
        if let Some(wanted) = bearing(self.actor.position, target) {
            let yaw = self.actor.orientation.yaw;
            self.actor.orientation.yaw = lerp_angle(yaw, wanted, config.rotation_speed * dt);
        }
    }

    /// Approach, retreat and strafe relative to `target`.
    #[allow(clippy::too_many_arguments)]
    pub fn steer<W: World + ?Sized>(
        &mut self,
        target: Vec3,
        distance: f32,
        config: &EnemyConfig,
        world: &mut W,
        rng: &mut DeterministicRng,
        now: f64,
        dt: f32,
    ) {
        if now >= self.brain.next_strafe_change {
            self.brain.strafe = rng.range_f32(-1.0, 1.0);
            let jitter = rng.range_f32(-config.strafe_jitter, config.strafe_jitter);
            self.brain.next_strafe_change = now + (config.strafe_change_interval + jitter) as f64;
        }

        let to_target = horizontal(target - self.actor.position).normalize_or_zero();
        let mut motion = Vec3::ZERO;
        if distance < config.min_distance {
            motion -= to_target * config.move_speed;
        } else if distance > config.max_distance {
            motion += to_target * config.move_speed;
        }
        motion += Vec3::Y.cross(to_target) * self.brain.strafe * config.strafe_speed;

        if config.physics_body {
            world.move_actor(&mut self.actor, (motion - Vec3::Y * config.fall_speed) * dt);
        } else {
            self.actor.position += motion * dt;
            world.place_actor(&self.actor);
        }
    }

    /// Check if a ray from the muzzle reaches `target` before anything else.
    pub fn has_line_of_sight<W: World + ?Sized>(&self, target: &Actor, config: &EnemyConfig, world: &W) -> bool {
        let origin = self.muzzle(config);
        let direction = (aim_point(target, config) - origin).normalize_or_zero();
        if direction == Vec3::ZERO {
            return false;
        }
        world.raycast(origin, direction, config.attack_range).target == Some(target.id)
    }

    /// Shoot at `target`, consuming the cooldown.
    pub fn attack<W: World + ?Sized>(
        &mut self,
        target: &Actor,
        config: &EnemyConfig,
        world: &W,
        rng: &mut DeterministicRng,
        now: f64,
    ) -> BotShot {
        self.brain.last_attack_time = Some(now);

        let origin = self.muzzle(config);
        let mut aim = aim_point(target, config);
        let aimed = rng.next_f32() <= config.accuracy;
        if !aimed {
            aim += rng.inside_unit_sphere() * config.miss_radius;
        }

        let direction = (aim - origin).normalize_or_zero();
        let hit = if direction == Vec3::ZERO {
            HitResult::miss(origin, direction, config.attack_range)
        } else {
            world.raycast(origin, direction, config.attack_range)
        };

        let killed = match hit.target {
            Some(id) if id == target.id => Some(id),
            Some(id) if config.friendly_fire && id != self.actor.id => Some(id),
            _ => None,
        };

        trace!(shooter = %self.actor.id, aimed, target = ?hit.target, "bot fired");

        BotShot {
            shooter: self.actor.id,
            aimed,
            hit,
            killed,
            beam_start: origin,
            beam_end: hit.point,
        }
    }

    /// Mark dead. Only the first call returns true.
    pub fn die(&mut self) -> bool {
        if self.actor.dead {
            return false;
        }
        self.actor.dead = true;
        true
    }

    /// Bring back to life at `position`; the first shot waits a full cooldown.
    pub fn respawn<W: World + ?Sized>(&mut self, position: Vec3, now: f64, world: &mut W) {
        self.actor.reset_at(position);
        teleport(&mut self.actor, world, position);
        self.brain.last_attack_time = Some(now);
    }
}

/// Point bots aim at on `target`.
#[inline]
pub fn aim_point(target: &Actor, config: &EnemyConfig) -> Vec3 {
    target.position + Vec3::Y * config.aim_height
}

// =============================================================================
// TESTS
// =============================================================================
