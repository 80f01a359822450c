//! Game Logic Module
//!
//! All game simulation code. Deterministic for a given seed, config and
//! intent stream.
//!
//! ## Module Structure
//!
//! - `actor`: Actor ids, kinematic state, the `Combatant` view
//! - `config`: Tuning structs and JSON loading
//! - `input`: Intents, raw-input edge tracking, replay logs
//! - `world`: Collision queries and the built-in box arena
//! - `movement`: Ground/air physics, jumps and dashes
//! - `weapon`: Railgun hitscan and rail jumps
//! - `enemy`: Bot AI
//! - `player`: The human-driven combatant
//! - `spawn`: Spawn point selection
//! - `schedule`: Timed respawn queue
//! - `state`: Match state, kills, deaths, spawn coordination
//! - `tick`: Authoritative simulation loop
//! - `events`: Game events for presentation/replay

pub mod actor;
pub mod config;
pub mod input;
pub mod world;
pub mod movement;
pub mod weapon;
pub mod enemy;
pub mod player;
pub mod spawn;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod events;

// Re-export key types
pub use actor::{Actor, ActorId, ActorKind, Combatant, MoveState, Orientation};
pub use config::{ConfigError, SimConfig};
pub use input::{Intent, InputTracker, IntentLog, RawInput};
pub use world::{FlatArena, HitResult, World};
pub use state::MatchState;
pub use tick::{tick, replay_match, TickResult};
pub use events::{EventSink, GameEvent, GameEventData};
