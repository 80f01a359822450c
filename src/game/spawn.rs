//! Spawn Selection
//!
//! Spawn points are registered once when the arena is built. Players come
//! back at the point farthest from every living bot; bots come back at a
//! random point out of the player's face.

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::game::config::SpawnConfig;

/// A registered spawn location.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Feet position
    pub position: Vec3,
}

/// Ordered set of spawn points.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpawnRegistry {
    points: Vec<SpawnPoint>,
}

impl SpawnRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `positions` in order.
    pub fn from_positions(positions: &[Vec3]) -> Self {
        Self {
            points: positions.iter().map(|&position| SpawnPoint { position }).collect(),
        }
    }

    /// Add a point at the end.
    pub fn register(&mut self, position: Vec3) {
        self.points.push(SpawnPoint { position });
    }

    /// Registered points in order.
    pub fn points(&self) -> &[SpawnPoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no point is registered.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Safest point for the player.
    ///
    /// Maximizes the minimum distance to `bots`; ties keep the earliest
    /// registered point. With no points, returns `fallback`.
    pub fn player_spawn<I>(&self, bots: I, fallback: Vec3) -> Vec3
    where
        I: IntoIterator<Item = Vec3>,
        I::IntoIter: Clone,
    {
        let bots = bots.into_iter();
        let Some(first) = self.points.first() else {
            return fallback;
        };

        let mut best = first.position;
        let mut best_distance = 0.0f32;
        for point in &self.points {
            let nearest = bots
                .clone()
                .map(|bot| point.position.distance(bot))
                .fold(f32::MAX, f32::min);
            if nearest > best_distance {
                best_distance = nearest;
                best = point.position;
            }
        }
        best
    }

    /// Random point for a bot.
    ///
    /// Prefers points at least `min_spawn_distance` from the player, then any
    /// point, then a random arena position (retrying up to
    /// `fallback_attempts` times to respect the distance).
    pub fn bot_spawn(&self, player: Option<Vec3>, config: &SpawnConfig, rng: &mut DeterministicRng) -> Vec3 {
        let far_enough = |p: Vec3| player.map_or(true, |pp| p.distance(pp) >= config.min_spawn_distance);

        if !self.points.is_empty() {
            let valid: Vec<Vec3> = self
                .points
                .iter()
                .map(|p| p.position)
                .filter(|&p| far_enough(p))
                .collect();

            if let Some(&p) = rng.choose(&valid) {
                return p;
            }
            if let Some(p) = rng.choose(&self.points) {
                return p.position;
            }
        }

        let random_position = |rng: &mut DeterministicRng| {
            let e = config.fallback_half_extent;
            Vec3::new(rng.range_f32(-e, e), config.fallback_height, rng.range_f32(-e, e))
        };

        let mut candidate = random_position(rng);
        let mut attempts = 0;
        while !far_enough(candidate) && attempts < config.fallback_attempts {
            candidate = random_position(rng);
            attempts += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SpawnRegistry {
        SpawnRegistry::from_positions(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(30.0, 0.0, 0.0),
            Vec3::new(-30.0, 0.0, 0.0),
        ])
    }

    #[test]
    fn test_player_spawn_maximizes_min_distance() {
        let reg = registry();
        let bots = [Vec3::new(28.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        assert_eq!(reg.player_spawn(bots, Vec3::Y), Vec3::new(-30.0, 0.0, 0.0));
    }

    #[test]
    fn test_player_spawn_ties_keep_first() {
        let reg = registry();
        assert_eq!(reg.player_spawn(std::iter::empty(), Vec3::Y), Vec3::ZERO);

        // Equidistant from a bot at the origin
        let reg = SpawnRegistry::from_positions(&[Vec3::new(10.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0)]);
        assert_eq!(reg.player_spawn([Vec3::ZERO], Vec3::Y), Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_player_spawn_fallback() {
        let reg = SpawnRegistry::new();
        assert_eq!(reg.player_spawn([Vec3::ZERO], Vec3::new(0.0, 1.0, 0.0)), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_bot_spawn_respects_distance() {
        let reg = registry();
        let config = SpawnConfig::default();
        let mut rng = DeterministicRng::new(3);

        for _ in 0..100 {
            let p = reg.bot_spawn(Some(Vec3::new(28.0, 0.0, 0.0)), &config, &mut rng);
            assert!(p == Vec3::ZERO || p == Vec3::new(-30.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_bot_spawn_any_point_when_all_close() {
        let reg = SpawnRegistry::from_positions(&[Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)]);
        let config = SpawnConfig::default();
        let mut rng = DeterministicRng::new(4);

        let p = reg.bot_spawn(Some(Vec3::ZERO), &config, &mut rng);
        assert!(reg.points().iter().any(|sp| sp.position == p));
    }

    #[test]
    fn test_bot_spawn_fallback_in_arena() {
        let reg = SpawnRegistry::new();
        let config = SpawnConfig::default();
        let mut rng = DeterministicRng::new(5);

        for _ in 0..50 {
            let p = reg.bot_spawn(Some(Vec3::ZERO), &config, &mut rng);
            assert!(p.x.abs() <= config.fallback_half_extent);
            assert!(p.z.abs() <= config.fallback_half_extent);
            assert_eq!(p.y, config.fallback_height);
        }
    }

    #[test]
    fn test_bot_spawn_deterministic() {
        let reg = registry();
        let config = SpawnConfig::default();
        let mut a = DeterministicRng::new(77);
        let mut b = DeterministicRng::new(77);

        for _ in 0..20 {
            assert_eq!(
                reg.bot_spawn(Some(Vec3::ZERO), &config, &mut a),
                reg.bot_spawn(Some(Vec3::ZERO), &config, &mut b)
            );
        }
    }
}
