//! Player Combatant
//!
//! The human-driven actor and its railgun.

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::game::actor::{Actor, ActorId, ActorKind, Combatant};
use crate::game::movement::teleport;
use crate::game::weapon::Railgun;
use crate::game::world::World;

/// The local player.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    /// Kinematic body
    pub actor: Actor,
    /// Weapon state
    pub railgun: Railgun,
}

impl Combatant for Player {
    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl Player {
    /// Fresh player at `position`.
    pub fn new(position: Vec3) -> Self {
        Self {
            actor: Actor::new(ActorId::PLAYER, ActorKind::Player, position),
            railgun: Railgun::default(),
        }
    }

    /// Mark dead and stop in place. Only the first call returns true.
    pub fn die(&mut self) -> bool {
        if self.actor.dead {
            return false;
        }
        self.actor.dead = true;
        self.actor.velocity = Vec3::ZERO;
        true
    }

    /// Bring back to life at `position`. The railgun cooldown carries over.
    pub fn respawn<W: World + ?Sized>(&mut self, position: Vec3, world: &mut W) {
        self.actor.reset_at(position);
        teleport(&mut self.actor, world, position);
    }

    /// Hash player state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        self.actor.hash_into(hasher);
        hasher.update_opt_f64(self.railgun.last_fire_time);
    }
}
