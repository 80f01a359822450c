//! Actor State
//!
//! One [`Actor`] per player or bot: the kinematic body that the movement
//! simulator integrates, the weapon and AI read, and the world collides.
//! Actors are created on spawn and reset (never destroyed) on respawn.

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::math::{look_direction, yaw_forward};

// =============================================================================
// ACTOR ID
// =============================================================================

/// Stable actor identifier.
///
/// Implements Ord for deterministic BTreeMap ordering. The player is always
/// [`ActorId::PLAYER`]; bots get increasing ids from 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl ActorId {
    /// The local player.
    pub const PLAYER: ActorId = ActorId(0);

    /// First bot id.
    pub const FIRST_BOT: ActorId = ActorId(1);

    /// Next id in sequence.
    #[inline]
    pub fn next(self) -> ActorId {
        ActorId(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What controls an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActorKind {
    /// Human-driven
    Player = 0,
    /// AI-driven
    Bot = 1,
}

// =============================================================================
// ORIENTATION / MOVE STATE
// =============================================================================

/// Yaw and pitch in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Rotation about +Y (0 faces +Z)
    pub yaw: f32,
    /// Positive looks up
    pub pitch: f32,
}

impl Orientation {
    /// Horizontal facing.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        yaw_forward(self.yaw)
    }

    /// Full view direction including pitch.
    #[inline]
    pub fn look_direction(&self) -> Vec3 {
        look_direction(self.yaw, self.pitch)
    }
}

/// Dash state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum MoveState {
    /// Regular ground/air physics
    #[default]
    Normal,
    /// Fixed-direction dash; all other physics suspended
    Dashing {
        /// Unit horizontal direction
        direction: Vec3,
        /// Dash time left (s)
        remaining: f32,
    },
}

impl MoveState {
    /// Check if a dash is in progress.
    #[inline]
    pub fn is_dashing(&self) -> bool {
        matches!(self, MoveState::Dashing { .. })
    }
}

// =============================================================================
// ACTOR
// =============================================================================

/// Kinematic body of a player or bot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Actor {
    /// Unique id
    pub id: ActorId,

    /// Player or bot
    pub kind: ActorKind,

    /// Feet position
    pub position: Vec3,

    /// View orientation
    pub orientation: Orientation,

    /// Current velocity (units/s)
    pub velocity: Vec3,

    /// Ground contact as of the last movement update
    pub grounded: bool,

    /// Jumps used since last grounded
    pub jump_count: u8,

    /// Dash state machine
    pub move_state: MoveState,

    /// Time until the next dash is allowed (s)
    pub dash_cooldown_remaining: f32,

    /// Time since jump was last pressed (s)
    pub since_jump_press: f32,

    /// Dead actors ignore intents until respawned
    pub dead: bool,
}

impl Actor {
    /// Create a live actor at rest.
    pub fn new(id: ActorId, kind: ActorKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            position,
            orientation: Orientation::default(),
            velocity: Vec3::ZERO,
            grounded: false,
            jump_count: 0,
            move_state: MoveState::Normal,
            dash_cooldown_remaining: 0.0,
            since_jump_press: f32::MAX,
            dead: false,
        }
    }

    /// Check if alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Eye position for a given eye height.
    #[inline]
    pub fn eye_position(&self, eye_height: f32) -> Vec3 {
        self.position + Vec3::Y * eye_height
    }

    /// Bring the actor back to life at `position` with fresh kinematics.
    ///
    /// Orientation is kept; the caller syncs the world body.
    pub fn reset_at(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.grounded = false;
        self.jump_count = 0;
        self.move_state = MoveState::Normal;
        self.dash_cooldown_remaining = 0.0;
        self.since_jump_press = f32::MAX;
        self.dead = false;
    }

    /// Hash actor state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u8(self.kind as u8);
        hasher.update_vec3(self.position);
        hasher.update_f32(self.orientation.yaw);
        hasher.update_f32(self.orientation.pitch);
        hasher.update_vec3(self.velocity);
        hasher.update_bool(self.grounded);
        hasher.update_u8(self.jump_count);
        match self.move_state {
            MoveState::Normal => hasher.update_u8(0),
            MoveState::Dashing { direction, remaining } => {
                hasher.update_u8(1);
                hasher.update_vec3(direction);
                hasher.update_f32(remaining);
            }
        }
        hasher.update_f32(self.dash_cooldown_remaining);
        hasher.update_f32(self.since_jump_press);
        hasher.update_bool(self.dead);
    }
}

// =============================================================================
// COMBATANT
// =============================================================================

/// Capability shared by everything that can shoot and be shot.
pub trait Combatant {
    /// The underlying body.
    fn actor(&self) -> &Actor;

    /// Unique id.
    fn id(&self) -> ActorId {
        self.actor().id
    }

    /// Player or bot.
    fn kind(&self) -> ActorKind {
        self.actor().kind
    }

    /// Feet position.
    fn position(&self) -> Vec3 {
        self.actor().position
    }

    /// Current velocity.
    fn velocity(&self) -> Vec3 {
        self.actor().velocity
    }

    /// Check if alive.
    fn is_alive(&self) -> bool {
        self.actor().is_alive()
    }
}

impl Combatant for Actor {
    fn actor(&self) -> &Actor {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_ordering() {
        assert!(ActorId::PLAYER < ActorId::FIRST_BOT);
        assert_eq!(ActorId::FIRST_BOT.next(), ActorId(2));
        assert_eq!(ActorId(3).to_string(), "#3");
    }

    #[test]
    fn test_reset_clears_kinematics() {
        let mut actor = Actor::new(ActorId(4), ActorKind::Bot, Vec3::ZERO);
        actor.velocity = Vec3::new(3.0, 4.0, 5.0);
        actor.jump_count = 2;
        actor.move_state = MoveState::Dashing { direction: Vec3::X, remaining: 0.05 };
        actor.orientation.yaw = 1.0;
        actor.dead = true;

        actor.reset_at(Vec3::new(1.0, 2.0, 3.0));

        assert!(actor.is_alive());
        assert_eq!(actor.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(actor.velocity, Vec3::ZERO);
        assert_eq!(actor.jump_count, 0);
        assert!(!actor.move_state.is_dashing());
        assert_eq!(actor.orientation.yaw, 1.0);
    }

    #[test]
    fn test_combatant_view() {
        let actor = Actor::new(ActorId::PLAYER, ActorKind::Player, Vec3::Y);
        let c: &dyn Combatant = &actor;
        assert_eq!(c.id(), ActorId::PLAYER);
        assert_eq!(c.kind(), ActorKind::Player);
        assert_eq!(c.position(), Vec3::Y);
        assert!(c.is_alive());
    }
}
