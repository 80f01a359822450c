//! Core deterministic primitives.
//!
//! Engine-free building blocks shared by every game module: vector helpers,
//! the seeded RNG, the simulation clock and state hashing.

pub mod math;
pub mod rng;
pub mod clock;
pub mod hash;

// Re-export core types
pub use rng::DeterministicRng;
pub use clock::SimClock;
pub use hash::{StateHash, StateHasher, compute_state_hash};
