//! State Hashing for Verification
//!
//! A match is summarised by one SHA-256 digest. Replays compare digests
//! instead of whole states: recorded intents must reproduce the live hash.
//!
//! Floats are hashed by their IEEE-754 bit pattern, so two states hash equal
//! only if every component is bit-identical.

use glam::Vec3;
use sha2::{Sha256, Digest};

/// 32-byte SHA-256 digest of a match state.
pub type StateHash = [u8; 32];

/// Streaming hasher for simulation state.
///
/// Fields must be fed in a fixed order; integers go in little-endian.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Hasher primed with a domain tag.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Hasher for [`crate::game::state::MatchState`].
    pub fn for_match_state() -> Self {
        Self::new(b"RAILHOP_STATE_V1")
    }

    /// Feed one byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Feed a `u32`.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Feed a `u64`.
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Feed an `f32` by bit pattern.
    #[inline]
    pub fn update_f32(&mut self, value: f32) {
        self.update_u32(value.to_bits());
    }

    /// Feed an `f64` by bit pattern.
    #[inline]
    pub fn update_f64(&mut self, value: f64) {
        self.update_u64(value.to_bits());
    }

    /// Feed an optional timestamp (tag byte, then the value).
    #[inline]
    pub fn update_opt_f64(&mut self, value: Option<f64>) {
        self.update_bool(value.is_some());
        if let Some(v) = value {
            self.update_f64(v);
        }
    }

    /// Feed x, y, z.
    #[inline]
    pub fn update_vec3(&mut self, value: Vec3) {
        for c in value.to_array() {
            self.update_f32(c);
        }
    }

    /// Feed a flag as one byte.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Consume the hasher.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Hash a match state.
///
/// Tick and seed always go first; `add_state` feeds the rest.
pub fn compute_state_hash<F>(tick: u32, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_match_state();
    hasher.update_u32(tick);
    hasher.update_u64(rng_seed);
    add_state(&mut hasher);
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================
