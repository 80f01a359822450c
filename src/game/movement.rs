//! Movement Simulation
//!
//! Per-actor kinematics: Quake-style ground/air acceleration, bunny hopping,
//! double jump and a fixed-distance dash. One call to [`advance`] integrates
//! one tick.
//!
//! ## Per-tick order (normal state)
//!
//! 1. Ground contact from the world; landing edge = grounded now, airborne before
//! 2. Grounded: friction (skipped on a bunny hop), ground acceleration,
//!    ground stick, jump
//! 3. Airborne: air acceleration (weak while falling), double jump
//! 4. Gravity (heavier while falling)
//! 5. Collision-aware move by `velocity * dt`
//!
//! While dashing, all of the above is suspended.

use glam::{Vec2, Vec3};
use tracing::trace;

use crate::core::math::{
    clamp_horizontal_speed, horizontal, wish_vector, wrap_angle, DIRECTION_EPSILON_SQ,
};
use crate::game::actor::{Actor, MoveState};
use crate::game::config::{LookConfig, MovementConfig};
use crate::game::input::Intent;
use crate::game::world::World;

/// Horizontal speed below which friction does nothing.
pub const FRICTION_STOP_SPEED: f32 = 0.1;

/// Ground acceleration rate, in wish speeds per second.
pub const GROUND_ACCEL_FACTOR: f32 = 10.0;

/// Move intent shorter than this dashes along the facing instead.
pub const DASH_INTENT_THRESHOLD: f32 = 0.1;

/// Dash time left below this ends the dash.
pub const DASH_END_EPSILON: f32 = 1e-5;

/// Fraction of dash speed kept as velocity when the dash ends.
pub const DASH_EXIT_SPEED_FACTOR: f32 = 0.5;

// =============================================================================
// ADVANCE
// =============================================================================

/// Integrate one tick of movement for `actor`.
///
/// Dead actors and non-positive steps are ignored.
pub fn advance<W: World + ?Sized>(
    actor: &mut Actor,
    config: &MovementConfig,
    intent: &Intent,
    world: &mut W,
    dt: f32,
) {
    if actor.dead || dt <= 0.0 {
        return;
    }

    tick_timers(actor, intent, dt);

    if intent.dash_requested {
        try_start_dash(actor, config, intent);
    }

    if let MoveState::Dashing { direction, remaining } = actor.move_state {
        step_dash(actor, config, world, direction, remaining, dt);
        return;
    }

    let was_grounded = actor.grounded;
    let grounded = world.is_grounded(actor);
    actor.grounded = grounded;
    let landed = grounded && !was_grounded;

    let wish = wish_vector(actor.orientation.yaw, intent.move_axes);
    let wish_speed = if intent.sprint {
        config.move_speed * config.sprint_multiplier
    } else {
        config.move_speed
    };

    if grounded {
        actor.jump_count = 0;

        let bunny_hop = landed && intent.jump_held;
        if !bunny_hop {
            apply_friction(actor, config, dt);
        }

        ground_accelerate(actor, config, wish, wish_speed, dt);

        if actor.velocity.y < 0.0 {
            actor.velocity.y = -config.ground_stick_speed;
        }

        if intent.jump_pressed || bunny_hop {
            actor.velocity.y = config.jump_force;
            actor.jump_count = 1;
        }
    } else {
        let control = if actor.velocity.y <= 0.0 {
            config.fall_air_control_multiplier
        } else {
            1.0
        };
        air_accelerate(actor, config, wish, wish_speed, control, dt);

        // Sprinting forfeits the air jump
        if intent.jump_pressed && actor.jump_count < config.max_jumps && !intent.sprint {
            actor.velocity.y = config.jump_force;
            actor.jump_count += 1;
        }
    }

    apply_gravity(actor, config, dt);

    let delta = actor.velocity * dt;
    world.move_actor(actor, delta);
}

fn tick_timers(actor: &mut Actor, intent: &Intent, dt: f32) {
    actor.dash_cooldown_remaining = (actor.dash_cooldown_remaining - dt).max(0.0);
    if intent.jump_pressed {
        actor.since_jump_press = 0.0;
    } else {
        actor.since_jump_press += dt;
    }
}

fn apply_gravity(actor: &mut Actor, config: &MovementConfig, dt: f32) {
    if actor.velocity.y <= 0.0 {
        actor.velocity.y -= config.gravity * config.fall_gravity_multiplier * dt;
    } else {
        actor.velocity.y -= config.gravity * dt;
    }
}

// =============================================================================
// GROUND / AIR
// =============================================================================

fn apply_friction(actor: &mut Actor, config: &MovementConfig, dt: f32) {
    let speed = horizontal(actor.velocity).length();
    if speed < FRICTION_STOP_SPEED {
        return;
    }

    let drop = speed * config.ground_friction * dt;
    let scale = (speed - drop).max(0.0) / speed;
    actor.velocity.x *= scale;
    actor.velocity.z *= scale;
}

fn ground_accelerate(actor: &mut Actor, config: &MovementConfig, wish: Vec3, wish_speed: f32, dt: f32) {
    // No wish: nothing to add, but the bunny cap still applies
    if wish.length_squared() >= DIRECTION_EPSILON_SQ {
        let current = horizontal(actor.velocity).dot(wish);
        let add = wish_speed - current;
        if add <= 0.0 {
            return;
        }

        let accel = (wish_speed * GROUND_ACCEL_FACTOR * dt).min(add);
        actor.velocity.x += wish.x * accel;
        actor.velocity.z += wish.z * accel;
    }
    actor.velocity = clamp_horizontal_speed(actor.velocity, config.max_bunny_speed);
}

fn air_accelerate(
    actor: &mut Actor,
    config: &MovementConfig,
    wish: Vec3,
    wish_speed: f32,
    control: f32,
    dt: f32,
) {
    if wish.length_squared() >= DIRECTION_EPSILON_SQ {
        let cap = config.max_air_speed().min(wish_speed);
        let current = horizontal(actor.velocity).dot(wish);
        let add = cap - current;
        if add <= 0.0 {
            return;
        }

        let accel = (config.air_acceleration * control * dt).min(add);
        actor.velocity.x += wish.x * accel;
        actor.velocity.z += wish.z * accel;
    }
    actor.velocity = clamp_horizontal_speed(actor.velocity, config.max_bunny_speed);
}

// =============================================================================
// DASH
// =============================================================================

fn try_start_dash(actor: &mut Actor, config: &MovementConfig, intent: &Intent) {
    if actor.move_state.is_dashing() || actor.dash_cooldown_remaining > 0.0 {
        return;
    }

    let wish = wish_vector(actor.orientation.yaw, intent.move_axes);
    let direction = if wish.length() < DASH_INTENT_THRESHOLD {
        actor.orientation.forward()
    } else {
        horizontal(wish).normalize()
    };

    actor.velocity.y = 0.0;
    actor.dash_cooldown_remaining = config.dash_cooldown;
    actor.move_state = MoveState::Dashing {
        direction,
        remaining: config.dash_duration,
    };

    trace!(actor = %actor.id, ?direction, "dash started");
}

fn step_dash<W: World + ?Sized>(
    actor: &mut Actor,
    config: &MovementConfig,
    world: &mut W,
    direction: Vec3,
    remaining: f32,
    dt: f32,
) {
    let speed = config.dash_speed();
    let step = dt.min(remaining);
    world.move_actor(actor, direction * speed * step);

    let remaining = remaining - step;
    if remaining <= DASH_END_EPSILON {
        let mut exit = direction * speed * DASH_EXIT_SPEED_FACTOR;
        exit.y = -config.ground_stick_speed;
        actor.velocity = exit;
        actor.move_state = MoveState::Normal;
    } else {
        actor.move_state = MoveState::Dashing { direction, remaining };
    }
}

// =============================================================================
// EXTERNAL EFFECTS
// =============================================================================

/// Apply an external impulse (rail jump, knockback).
///
/// Counts as the ground jump, so one air jump stays available.
pub fn add_velocity(actor: &mut Actor, impulse: Vec3) {
    actor.velocity += impulse;
    actor.jump_count = 1;
}

/// Move the actor instantly, zeroing velocity and cancelling any dash.
pub fn teleport<W: World + ?Sized>(actor: &mut Actor, world: &mut W, position: Vec3) {
    actor.position = position;
    actor.velocity = Vec3::ZERO;
    actor.move_state = MoveState::Normal;
    world.place_actor(actor);
}

/// Integrate a look delta into yaw and pitch.
///
/// Pitch is clamped to `±max_look_angle`.
pub fn apply_look(actor: &mut Actor, look: &LookConfig, delta: Vec2) {
    if actor.dead {
        return;
    }

    let sensitivity = look.mouse_sensitivity.to_radians();
    let limit = look.max_look_angle.to_radians();
    let dy = if look.invert_y { -delta.y } else { delta.y };

    actor.orientation.yaw = wrap_angle(actor.orientation.yaw + delta.x * sensitivity);
    actor.orientation.pitch = (actor.orientation.pitch + dy * sensitivity).clamp(-limit, limit);
}

// =============================================================================
// TESTS
// =============================================================================
