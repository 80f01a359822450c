//! Railgun
//!
//! Cooldown-gated hitscan. A shot that lands close to the shooter launches
//! them: the rail jump. The boost fades quadratically with height above the
//! ground and gets a bonus when jump was pressed just before the shot.
//!
//! ```text
//! h      = clamp01(distance_to_ground / max_effective_height)
//! up     = min(base_up * (1 - h)^2 * combo, jump_force * 3)
//! up     = max(0, up - velocity.y)        (only while rising)
//! impulse = normalize(shooter - hit) * rail_jump_force + Y * up
//! ```
//!
//! Kills are reported back to the caller rather than applied here, so kill
//! bookkeeping stays in one place.

use glam::Vec3;
use serde::{Serialize, Deserialize};
use tracing::trace;

use crate::core::math::clamp01;
use crate::game::actor::{Actor, ActorId};
use crate::game::config::{MovementConfig, RailgunConfig};
use crate::game::movement::add_velocity;
use crate::game::world::{HitResult, World};

/// Cap on the rail-jump up force, in jump forces.
pub const MAX_UP_FORCE_JUMPS: f32 = 3.0;

/// Per-weapon mutable state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Railgun {
    /// Simulated time of the last shot, `None` before the first
    pub last_fire_time: Option<f64>,
}

/// Outcome of a shot that actually fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RailShot {
    /// Raw ray result
    pub hit: HitResult,
    /// Actor the ray hit; the caller applies the kill
    pub killed: Option<ActorId>,
    /// Rail-jump impulse already applied to the shooter
    pub impulse: Option<Vec3>,
    /// Beam start (muzzle)
    pub beam_start: Vec3,
    /// Beam end (hit point or full range)
    pub beam_end: Vec3,
}

impl Railgun {
    /// Check if the cooldown has elapsed at `now`.
    #[inline]
    pub fn can_fire(&self, config: &RailgunConfig, now: f64) -> bool {
        match self.last_fire_time {
            Some(last) => now >= last + config.cooldown as f64,
            None => true,
        }
    }

    /// Seconds until the next shot is allowed.
    pub fn cooldown_remaining(&self, config: &RailgunConfig, now: f64) -> f32 {
        match self.last_fire_time {
            Some(last) => ((last + config.cooldown as f64) - now).max(0.0) as f32,
            None => 0.0,
        }
    }

    /// Fire if the cooldown allows.
    ///
    /// Returns `None` and changes nothing while cooling down. Otherwise
    /// consumes the cooldown, casts one ray of `range` from `origin`, applies
    /// any rail jump to `shooter` and reports what was hit.
    #[allow(clippy::too_many_arguments)]
    pub fn try_fire<W: World + ?Sized>(
        &mut self,
        config: &RailgunConfig,
        shooter: &mut Actor,
        movement: &MovementConfig,
        world: &W,
        origin: Vec3,
        direction: Vec3,
        now: f64,
    ) -> Option<RailShot> {
        if shooter.dead || !self.can_fire(config, now) {
            return None;
        }
        self.last_fire_time = Some(now);

        let hit = world.raycast(origin, direction, config.range);

        let mut impulse = None;
        if hit.hit_something && shooter.position.distance(hit.point) <= config.rail_jump_radius {
            let height = world.distance_to_ground(shooter);
            let boost = rail_jump_impulse(config, movement, shooter, hit.point, height);
            add_velocity(shooter, boost);
            impulse = Some(boost);
        }

        trace!(
            shooter = %shooter.id,
            hit = hit.hit_something,
            target = ?hit.target,
            rail_jump = impulse.is_some(),
            "railgun fired"
        );

        Some(RailShot {
            hit,
            killed: hit.target,
            impulse,
            beam_start: origin + direction * config.muzzle_offset,
            beam_end: hit.point,
        })
    }
}

/// Vertical part of the rail-jump boost.
///
/// `height` is the shooter's distance to the ground when the shot fires.
pub fn rail_jump_up_force(
    config: &RailgunConfig,
    movement: &MovementConfig,
    height: f32,
    since_jump_press: f32,
    vertical_velocity: f32,
) -> f32 {
    let h = clamp01(height / config.max_effective_height);
    let height_factor = (1.0 - h) * (1.0 - h);
    let combo = if since_jump_press <= config.combo_window {
        config.jump_combo_bonus
    } else {
        1.0
    };

    let mut up = (config.rail_jump_base_up_force * height_factor * combo)
        .min(movement.jump_force * MAX_UP_FORCE_JUMPS);
    if vertical_velocity > 0.0 {
        up = (up - vertical_velocity).max(0.0);
    }
    up
}

/// Full rail-jump impulse for a shot landing at `hit_point`.
pub fn rail_jump_impulse(
    config: &RailgunConfig,
    movement: &MovementConfig,
    shooter: &Actor,
    hit_point: Vec3,
    height: f32,
) -> Vec3 {
    let push = (shooter.position - hit_point).normalize_or_zero();
    let up = rail_jump_up_force(
        config,
        movement,
        height,
        shooter.since_jump_press,
        shooter.velocity.y,
    );
    push * config.rail_jump_force + Vec3::Y * up
}

// =============================================================================
// TESTS
// =============================================================================
