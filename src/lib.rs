//! # Railhop Simulation Core
//!
//! Deterministic movement, railgun and bot simulation for the Railhop arena
//! shooter. Engine-free: the host supplies collision through the
//! [`game::World`] trait and drives time by calling [`game::tick`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RAILHOP SIMULATION                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── math.rs     - Yaw/pitch vectors, angle helpers          │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  ├── clock.rs    - Monotonic simulated time                  │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Intents, edge tracking, replay logs       │
//! │  ├── movement.rs - Air control, bunny hop, jumps, dash       │
//! │  ├── weapon.rs   - Railgun hitscan and rail jump             │
//! │  ├── enemy.rs    - Bot AI                                    │
//! │  ├── state.rs    - Match state and spawn coordination        │
//! │  ├── world.rs    - Collision trait and box arena             │
//! │  └── tick.rs     - Authoritative simulation loop             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `game/` modules never read wall-clock time or global
//! state:
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - Time only advances through `tick(dt)`
//! - All randomness from the match's seeded Xorshift128+
//!
//! Given the same seed, config, world and intents, a match produces the
//! same state hash on every run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use crate::core::hash::StateHash;
pub use game::config::SimConfig;
pub use game::input::{Intent, IntentLog};
pub use game::state::MatchState;
pub use game::world::World;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Fixed step at [`TICK_RATE`] (s)
pub const TICK_DT: f32 = 1.0 / TICK_RATE as f32;
