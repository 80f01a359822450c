//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded through SplitMix64. The stream depends only on the
//! seed.
//!
//! Every stochastic decision in the simulation (bot accuracy rolls, miss
//! offsets, strafe changes, spawn point picks) draws from one match-owned
//! instance, so a seed plus an input log fully determines a match.

use glam::Vec3;
use serde::{Serialize, Deserialize};

/// Seeded Xorshift128+ generator.
///
/// # Example
///
/// ```
/// use railhop::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Seed a generator. Both state words come from SplitMix64, so nearby
    /// seeds still give unrelated streams.
    pub fn new(seed: u64) -> Self {
        let mut mix = seed;
        let mut state = [splitmix64(&mut mix), splitmix64(&mut mix)];
        if state == [0, 0] {
            // The all-zero state is a fixed point
            state = [1, 1];
        }
        Self { state }
    }

    /// Next raw 64-bit output.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let [s0, mut s1] = self.state;
        let out = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state = [s0.rotate_left(24) ^ s1 ^ (s1 << 16), s1.rotate_left(37)];
        out
    }

    /// Low 32 bits of the next output.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    /// Integer in `[0, max)`; 0 when `max` is 0.
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        // Multiply-shift keeps the high bits and avoids a division
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Float in `[0, 1)` built from 24 random bits.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        const SCALE: f32 = 1.0 / (1u32 << 24) as f32;
        (self.next_u64() >> 40) as f32 * SCALE
    }

    /// Float in `[min, max)`, or `min` for an empty range.
    #[inline]
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_f32()
    }

    /// Uniform point in the unit ball (rejection sampled).
    pub fn inside_unit_sphere(&mut self) -> Vec3 {
        loop {
            let x = self.range_f32(-1.0, 1.0);
            let y = self.range_f32(-1.0, 1.0);
            let z = self.range_f32(-1.0, 1.0);
            let p = Vec3::new(x, y, z);
            if p.length_squared() <= 1.0 {
                return p;
            }
        }
    }

    /// Uniform index below `len`, `None` for an empty collection.
    pub fn choose_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.next_int(len as u32) as usize)
    }

    /// Uniform element of `slice`.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        let idx = self.choose_index(slice.len())?;
        slice.get(idx)
    }

    /// Raw state words, hashed into the match state.
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Overwrite the raw state words.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = DeterministicRng::new(12345);
        let mut b = DeterministicRng::new(12345);
        let xs: Vec<u64> = (0..500).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..500).map(|_| b.next_u64()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_neighbouring_seeds_diverge() {
        let mut a = DeterministicRng::new(1);
        let mut b = DeterministicRng::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_next_int_bounds() {
        let mut rng = DeterministicRng::new(1234);
        let mut seen = [false; 7];
        for _ in 0..1000 {
            let v = rng.next_int(7);
            assert!(v < 7);
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(rng.next_int(0), 0);
        assert_eq!(rng.next_int(1), 0);
    }

    #[test]
    fn test_unit_float_mean() {
        let mut rng = DeterministicRng::new(9999);
        let n = 10_000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
            sum += v as f64;
        }
        let mean = sum / n as f64;
        assert!((mean - 0.5).abs() < 0.02, "mean was {}", mean);
    }

    #[test]
    fn test_range_f32() {
        let mut rng = DeterministicRng::new(4242);
        for _ in 0..1000 {
            let v = rng.range_f32(-0.5, 0.5);
            assert!((-0.5..0.5).contains(&v));
        }
        assert_eq!(rng.range_f32(3.0, 3.0), 3.0);
        assert_eq!(rng.range_f32(3.0, 1.0), 3.0);
    }

    #[test]
    fn test_inside_unit_sphere() {
        let mut rng = DeterministicRng::new(7777);
        let mut centroid = Vec3::ZERO;
        for _ in 0..2000 {
            let p = rng.inside_unit_sphere();
            assert!(p.length_squared() <= 1.0);
            centroid += p;
        }
        assert!((centroid / 2000.0).length() < 0.1);
    }

    #[test]
    fn test_choose() {
        let mut rng = DeterministicRng::new(1111);
        assert!(rng.choose::<u8>(&[]).is_none());

        let items = ['a', 'b', 'c'];
        for _ in 0..100 {
            assert!(items.contains(rng.choose(&items).unwrap()));
        }
    }

    #[test]
    fn test_state_round_trip_resumes_stream() {
        let mut rng = DeterministicRng::new(5555);
        rng.next_u64();
        let saved = rng.state();
        let ahead: Vec<u64> = (0..10).map(|_| rng.next_u64()).collect();

        let mut other = DeterministicRng::new(0);
        other.set_state(saved);
        let replayed: Vec<u64> = (0..10).map(|_| other.next_u64()).collect();
        assert_eq!(ahead, replayed);
    }
}
