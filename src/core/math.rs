//! Vector Helpers
//!
//! Small math helpers on top of `glam` shared by movement, weapons and AI.
//!
//! ## Conventions
//!
//! ```text
//!            +Y (up)
//!             │   +Z (forward at yaw = 0)
//!             │  /
//!             │ /
//!             └──────── +X (right at yaw = 0)
//! ```
//!
//! Yaw rotates clockwise seen from above, so `forward = (sin yaw, 0, cos yaw)`
//! and `right = up × forward = (cos yaw, 0, -sin yaw)`. Pitch is positive
//! when looking up.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

/// Squared length below which a direction is treated as zero.
pub const DIRECTION_EPSILON_SQ: f32 = 1e-8;

/// Drop the vertical component.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Clamp to `[0, 1]`.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Horizontal unit vector the actor faces at `yaw`.
#[inline]
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Horizontal unit vector to the right of `yaw`.
#[inline]
pub fn yaw_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Unit view direction for a yaw/pitch pair.
#[inline]
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    let (sp, cp) = pitch.sin_cos();
    Vec3::new(yaw.sin() * cp, sp, yaw.cos() * cp)
}

/// Yaw that faces from `from` toward `to` (ignores height).
///
/// Returns `None` when both points share the same column.
#[inline]
pub fn bearing(from: Vec3, to: Vec3) -> Option<f32> {
    let d = horizontal(to - from);
    if d.length_squared() < DIRECTION_EPSILON_SQ {
        return None;
    }
    Some(d.x.atan2(d.z))
}

/// Wrap an angle into `(-PI, PI]`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Interpolate between two yaw angles along the shortest arc.
///
/// `t` is clamped to `[0, 1]`, matching a spherical interpolation between two
/// pure-yaw rotations.
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = wrap_angle(to - from);
    wrap_angle(from + delta * clamp01(t))
}

/// World-space wish vector from strafe/forward axes.
///
/// `axes.x` strafes right, `axes.y` walks forward. Vectors longer than 1 are
/// normalized, shorter ones keep their magnitude (analog input).
#[inline]
pub fn wish_vector(yaw: f32, axes: Vec2) -> Vec3 {
    let wish = yaw_right(yaw) * axes.x + yaw_forward(yaw) * axes.y;
    if wish.length_squared() > 1.0 {
        wish.normalize()
    } else {
        wish
    }
}

/// Clamp the horizontal speed of `v` to `max`, keeping `v.y`.
#[inline]
pub fn clamp_horizontal_speed(v: Vec3, max: f32) -> Vec3 {
    let h = horizontal(v);
    let speed = h.length();
    if speed > max && speed > 0.0 {
        let clamped = h * (max / speed);
        Vec3::new(clamped.x, v.y, clamped.z)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_yaw_basis() {
        let f = yaw_forward(0.0);
        let r = yaw_right(0.0);
        assert!((f - Vec3::Z).length() < EPS);
        assert!((r - Vec3::X).length() < EPS);

        // right is always up x forward
        for yaw in [0.3f32, 1.7, -2.4, 3.0] {
            let expected = Vec3::Y.cross(yaw_forward(yaw));
            assert!((yaw_right(yaw) - expected).length() < EPS);
        }
    }

    #[test]
    fn test_look_direction_is_unit() {
        let d = look_direction(1.2, -0.4);
        assert!((d.length() - 1.0).abs() < EPS);
        assert!(d.y < 0.0);
    }

    #[test]
    fn test_bearing_matches_forward() {
        let from = Vec3::new(1.0, 0.0, 1.0);
        let to = Vec3::new(4.0, 7.0, -3.0);
        let yaw = bearing(from, to).unwrap();
        let dir = horizontal(to - from).normalize();
        assert!((yaw_forward(yaw) - dir).length() < EPS);

        assert_eq!(bearing(from, from + Vec3::Y * 3.0), None);
    }

    #[test]
    fn test_lerp_angle_shortest_arc() {
        // 170deg to -170deg goes through 180, not through 0
        let from = 170f32.to_radians();
        let to = (-170f32).to_radians();
        let mid = lerp_angle(from, to, 0.5);
        assert!((mid.abs() - PI).abs() < 1e-4);

        assert!((lerp_angle(0.5, 1.5, 2.0) - 1.5).abs() < EPS);
        assert!((lerp_angle(0.5, 1.5, 0.0) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_wish_vector_normalizes_diagonals() {
        let w = wish_vector(0.0, Vec2::new(1.0, 1.0));
        assert!((w.length() - 1.0).abs() < EPS);

        let half = wish_vector(0.0, Vec2::new(0.0, 0.5));
        assert!((half.length() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_clamp_horizontal_speed_keeps_vertical() {
        let v = Vec3::new(30.0, -4.0, 40.0);
        let c = clamp_horizontal_speed(v, 10.0);
        assert!((horizontal(c).length() - 10.0).abs() < 1e-4);
        assert_eq!(c.y, -4.0);
    }
}
