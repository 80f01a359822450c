//! World Queries
//!
//! The simulation never owns geometry. Everything it needs from the level
//! goes through the [`World`] trait: raycasts, ground contact and
//! collision-aware moves.
//!
//! [`FlatArena`] is a small reference implementation: a floor plane, static
//! box obstacles and one box per actor. Rays that start inside a box ignore
//! that box, so a shooter never hits its own body.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::game::actor::{Actor, ActorId};

/// Horizontal half extent of an actor body.
pub const BODY_HALF_WIDTH: f32 = 0.5;

/// Height of an actor body (feet to head).
pub const BODY_HEIGHT: f32 = 2.0;

/// Feet closer than this to a surface count as grounded.
pub const GROUND_EPSILON: f32 = 0.05;

/// Length of the probe used by the default [`World::distance_to_ground`].
pub const GROUND_PROBE_DISTANCE: f32 = 100.0;

// =============================================================================
// HIT RESULT
// =============================================================================

/// Outcome of a raycast.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    /// Anything was hit within range
    pub hit_something: bool,
    /// Hit point, or the end of the ray on a miss
    pub point: Vec3,
    /// Distance from origin to `point`
    pub distance: f32,
    /// Actor whose body was hit
    pub target: Option<ActorId>,
}

impl HitResult {
    /// A miss that ends at full range.
    pub fn miss(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            hit_something: false,
            point: origin + direction * max_distance,
            distance: max_distance,
            target: None,
        }
    }
}

// =============================================================================
// WORLD TRAIT
// =============================================================================

/// Collision queries the simulation depends on.
pub trait World {
    /// Cast a ray. `direction` is expected to be unit length.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> HitResult;

    /// Check if the actor stands on something.
    fn is_grounded(&self, actor: &Actor) -> bool;

    /// Move the actor by `delta`, resolving penetration.
    fn move_actor(&mut self, actor: &mut Actor, delta: Vec3);

    /// Sync the actor's body after a teleport, spawn, death or respawn.
    fn place_actor(&mut self, actor: &Actor);

    /// Drop the actor's body entirely.
    fn remove_actor(&mut self, _id: ActorId) {}

    /// Height of the feet above the nearest surface below.
    fn distance_to_ground(&self, actor: &Actor) -> f32 {
        if self.is_grounded(actor) {
            return 0.0;
        }
        let hit = self.raycast(actor.position, Vec3::NEG_Y, GROUND_PROBE_DISTANCE);
        if hit.hit_something {
            hit.distance
        } else {
            GROUND_PROBE_DISTANCE
        }
    }
}

// =============================================================================
// AABB
// =============================================================================

/// Axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Box from center and full size.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: center - half, max: center + half }
    }

    /// Body box of an actor standing at `feet`.
    pub fn body(feet: Vec3) -> Self {
        Self {
            min: feet - Vec3::new(BODY_HALF_WIDTH, 0.0, BODY_HALF_WIDTH),
            max: feet + Vec3::new(BODY_HALF_WIDTH, BODY_HEIGHT, BODY_HALF_WIDTH),
        }
    }

    /// Check if the point is inside or on the surface.
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Check for overlap with positive volume on every axis except `skip`.
    ///
    /// Touching faces do not count.
    #[inline]
    pub fn overlaps_except(&self, other: &Aabb, skip: usize) -> bool {
        const SKIN: f32 = 1e-4;
        (0..3).filter(|&axis| axis != skip).all(|axis| {
            self.min[axis] < other.max[axis] - SKIN && self.max[axis] > other.min[axis] + SKIN
        })
    }

    /// Check for overlap on the horizontal plane only.
    #[inline]
    pub fn overlaps_horizontally(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
            && self.min.z < other.max.z && self.max.z > other.min.z
    }

    /// Entry distance of a ray (slab test).
    ///
    /// Returns `None` when the ray misses, enters beyond `max_distance`, or
    /// starts inside the box.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        if self.contains(origin) {
            return None;
        }

        let mut t_min = 0.0f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < 1e-8 {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t1 = (self.min[axis] - o) * inv;
            let mut t2 = (self.max[axis] - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

// =============================================================================
// FLAT ARENA
// =============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct Body {
    position: Vec3,
    active: bool,
}

/// Floor plane plus static boxes plus actor bodies.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlatArena {
    floor_height: f32,
    obstacles: Vec<Aabb>,
    bodies: BTreeMap<ActorId, Body>,
    spawn_points: Vec<Vec3>,
}

impl FlatArena {
    /// Empty floor at `floor_height`, no obstacles, no spawn points.
    pub fn new(floor_height: f32) -> Self {
        Self {
            floor_height,
            obstacles: Vec::new(),
            bodies: BTreeMap::new(),
            spawn_points: Vec::new(),
        }
    }

    /// The demo arena: 80 x 80 walled floor, a raised centre platform and
    /// four corner pillars, with spawn points around the edge and on top.
    pub fn standard() -> Self {
        const HALF: f32 = 40.0;
        const WALL_HEIGHT: f32 = 20.0;
        const WALL_THICKNESS: f32 = 2.0;

        let mut arena = Self::new(0.0);

        // Walls
        let span = HALF * 2.0 + WALL_THICKNESS * 2.0;
        let offset = HALF + WALL_THICKNESS * 0.5;
        let y = WALL_HEIGHT * 0.5;
        arena.add_obstacle(Aabb::from_center_size(Vec3::new(0.0, y, offset), Vec3::new(span, WALL_HEIGHT, WALL_THICKNESS)));
        arena.add_obstacle(Aabb::from_center_size(Vec3::new(0.0, y, -offset), Vec3::new(span, WALL_HEIGHT, WALL_THICKNESS)));
        arena.add_obstacle(Aabb::from_center_size(Vec3::new(offset, y, 0.0), Vec3::new(WALL_THICKNESS, WALL_HEIGHT, span)));
        arena.add_obstacle(Aabb::from_center_size(Vec3::new(-offset, y, 0.0), Vec3::new(WALL_THICKNESS, WALL_HEIGHT, span)));

        // Centre platform
        arena.add_obstacle(Aabb::from_center_size(Vec3::new(0.0, 1.5, 0.0), Vec3::new(10.0, 3.0, 10.0)));

        // Pillars
        for (x, z) in [(20.0, 20.0), (-20.0, 20.0), (20.0, -20.0), (-20.0, -20.0)] {
            arena.add_obstacle(Aabb::from_center_size(Vec3::new(x, 4.0, z), Vec3::new(2.0, 8.0, 2.0)));
        }

        for p in [
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(30.0, 0.0, 0.0),
            Vec3::new(-30.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 30.0),
            Vec3::new(0.0, 0.0, -30.0),
            Vec3::new(30.0, 0.0, 30.0),
            Vec3::new(-30.0, 0.0, 30.0),
            Vec3::new(30.0, 0.0, -30.0),
            Vec3::new(-30.0, 0.0, -30.0),
        ] {
            arena.add_spawn_point(p);
        }

        arena
    }

    /// Add a static box.
    pub fn add_obstacle(&mut self, aabb: Aabb) {
        self.obstacles.push(aabb);
    }

    /// Add a spawn point.
    pub fn add_spawn_point(&mut self, position: Vec3) {
        self.spawn_points.push(position);
    }

    /// Spawn points in registration order.
    pub fn spawn_points(&self) -> &[Vec3] {
        &self.spawn_points
    }

    /// Height of the floor plane.
    pub fn floor_height(&self) -> f32 {
        self.floor_height
    }

    /// Number of bodies currently tracked.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn active_bodies(&self) -> impl Iterator<Item = (ActorId, Aabb)> + '_ {
        self.bodies
            .iter()
            .filter(|(_, body)| body.active)
            .map(|(id, body)| (*id, Aabb::body(body.position)))
    }

    /// Move `position` along one axis, stopping at the first obstacle face
    /// the body would cross.
    fn sweep_axis(&self, position: &mut Vec3, axis: usize, delta: f32) {
        const SKIN: f32 = 1e-4;
        let (lo, hi) = if axis == 1 {
            (0.0, BODY_HEIGHT)
        } else {
            (BODY_HALF_WIDTH, BODY_HALF_WIDTH)
        };

        let body = Aabb::body(*position);
        let start = position[axis];
        let mut end = start + delta;

        for obstacle in &self.obstacles {
            if !body.overlaps_except(obstacle, axis) {
                continue;
            }
            if delta > 0.0 {
                let face = obstacle.min[axis] - hi;
                if start <= face + SKIN && end > face {
                    end = face;
                }
            } else {
                let face = obstacle.max[axis] + lo;
                if start >= face - SKIN && end < face {
                    end = face;
                }
            }
        }

        position[axis] = end;
    }
}

impl Default for FlatArena {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl World for FlatArena {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> HitResult {
        let mut best: Option<(f32, Option<ActorId>)> = None;
        let mut consider = |t: f32, target: Option<ActorId>| {
            if t <= max_distance && best.map_or(true, |(b, _)| t < b) {
                best = Some((t, target));
            }
        };

        if direction.y < 0.0 && origin.y >= self.floor_height {
            consider((origin.y - self.floor_height) / -direction.y, None);
        }
        for obstacle in &self.obstacles {
            if let Some(t) = obstacle.ray_entry(origin, direction, max_distance) {
                consider(t, None);
            }
        }
        for (id, aabb) in self.active_bodies() {
            if let Some(t) = aabb.ray_entry(origin, direction, max_distance) {
                consider(t, Some(id));
            }
        }

        match best {
            Some((distance, target)) => HitResult {
                hit_something: true,
                point: origin + direction * distance,
                distance,
                target,
            },
            None => HitResult::miss(origin, direction, max_distance),
        }
    }

    fn is_grounded(&self, actor: &Actor) -> bool {
        let feet = actor.position.y;
        if feet <= self.floor_height + GROUND_EPSILON {
            return true;
        }
        let body = Aabb::body(actor.position);
        self.obstacles.iter().any(|o| {
            body.overlaps_horizontally(o) && (feet - o.max.y).abs() <= GROUND_EPSILON
        })
    }

    fn move_actor(&mut self, actor: &mut Actor, delta: Vec3) {
        let mut position = actor.position;

        for axis in [0usize, 2, 1] {
            if delta[axis] == 0.0 {
                continue;
            }
            self.sweep_axis(&mut position, axis, delta[axis]);
        }
        position.y = position.y.max(self.floor_height);

        actor.position = position;
        if let Some(body) = self.bodies.get_mut(&actor.id) {
            body.position = position;
        }
    }

    fn place_actor(&mut self, actor: &Actor) {
        self.bodies.insert(
            actor.id,
            Body { position: actor.position, active: actor.is_alive() },
        );
    }

    fn remove_actor(&mut self, id: ActorId) {
        self.bodies.remove(&id);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actor::ActorKind;

    fn bot(id: u32, position: Vec3) -> Actor {
        Actor::new(ActorId(id), ActorKind::Bot, position)
    }

    #[test]
    fn test_ray_hits_floor() {
        let arena = FlatArena::new(0.0);
        let hit = arena.raycast(Vec3::new(0.0, 4.0, 0.0), Vec3::NEG_Y, 10.0);
        assert!(hit.hit_something);
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert_eq!(hit.target, None);
    }

    #[test]
    fn test_ray_miss_reaches_full_range() {
        let arena = FlatArena::new(0.0);
        let hit = arena.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 50.0);
        assert!(!hit.hit_something);
        assert_eq!(hit.point, Vec3::new(0.0, 1.0, 50.0));
        assert_eq!(hit.distance, 50.0);
    }

    #[test]
    fn test_ray_hits_nearest_body_and_skips_own() {
        let mut arena = FlatArena::new(0.0);
        let shooter = bot(1, Vec3::ZERO);
        arena.place_actor(&shooter);
        arena.place_actor(&bot(2, Vec3::new(0.0, 0.0, 10.0)));
        arena.place_actor(&bot(3, Vec3::new(0.0, 0.0, 20.0)));

        let hit = arena.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 100.0);
        assert_eq!(hit.target, Some(ActorId(2)));
        assert!((hit.distance - 9.5).abs() < 1e-5);
    }

    #[test]
    fn test_dead_bodies_are_not_hit() {
        let mut arena = FlatArena::new(0.0);
        let mut target = bot(2, Vec3::new(0.0, 0.0, 10.0));
        target.dead = true;
        arena.place_actor(&target);

        let hit = arena.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 100.0);
        assert!(!hit.hit_something);
    }

    #[test]
    fn test_obstacle_blocks_ray() {
        let mut arena = FlatArena::new(0.0);
        arena.add_obstacle(Aabb::from_center_size(Vec3::new(0.0, 1.0, 5.0), Vec3::splat(2.0)));
        arena.place_actor(&bot(2, Vec3::new(0.0, 0.0, 10.0)));

        let hit = arena.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 100.0);
        assert!(hit.hit_something);
        assert_eq!(hit.target, None);
        assert!((hit.distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_move_stops_at_floor() {
        let mut arena = FlatArena::new(0.0);
        let mut actor = bot(1, Vec3::new(0.0, 1.0, 0.0));
        arena.place_actor(&actor);

        arena.move_actor(&mut actor, Vec3::new(2.0, -5.0, 0.0));
        assert_eq!(actor.position, Vec3::new(2.0, 0.0, 0.0));
        assert!(arena.is_grounded(&actor));
    }

    #[test]
    fn test_move_blocked_by_wall() {
        let mut arena = FlatArena::new(0.0);
        arena.add_obstacle(Aabb::from_center_size(Vec3::new(5.0, 2.0, 0.0), Vec3::new(2.0, 4.0, 10.0)));
        let mut actor = bot(1, Vec3::ZERO);

        arena.move_actor(&mut actor, Vec3::new(10.0, 0.0, 0.0));
        assert!((actor.position.x - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_land_on_box_top() {
        let mut arena = FlatArena::new(0.0);
        arena.add_obstacle(Aabb::from_center_size(Vec3::new(0.0, 1.5, 0.0), Vec3::new(4.0, 3.0, 4.0)));
        let mut actor = bot(1, Vec3::new(0.0, 5.0, 0.0));

        arena.move_actor(&mut actor, Vec3::new(0.0, -4.0, 0.0));
        assert!((actor.position.y - 3.0).abs() < 1e-5);
        assert!(arena.is_grounded(&actor));
        assert_eq!(arena.distance_to_ground(&actor), 0.0);
    }

    #[test]
    fn test_distance_to_ground_when_airborne() {
        let arena = FlatArena::new(0.0);
        let actor = bot(1, Vec3::new(0.0, 0.75, 0.0));
        assert!(!arena.is_grounded(&actor));
        assert!((arena.distance_to_ground(&actor) - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_standard_arena_has_spawns() {
        let arena = FlatArena::standard();
        assert_eq!(arena.spawn_points().len(), 9);
        assert_eq!(arena.body_count(), 0);
    }
}
