//! Interpolation primitives used by the controllers

use crate::foundation::math::{utils, Vec3};

/// Linear interpolation between two positions
///
/// `t = 0` yields `start`, `t = 1` yields `end`; `t` is not clamped.
pub fn lerp_vec3(start: &Vec3, end: &Vec3, t: f32) -> Vec3 {
    start * (1.0 - t) + end * t
}

/// Wrap an angle difference into `(-180, 180]` degrees
pub fn wrap_degrees(delta: f32) -> f32 {
    let wrapped = delta.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Interpolate between two angles (degrees) along the shorter arc
///
/// The result is not normalised; `angle_lerp(170, -170, 1)` is `190`, which
/// is the same direction as `-170`.
pub fn angle_lerp(start: f32, end: f32, t: f32) -> f32 {
    start + t * wrap_degrees(end - start)
}

/// Normalised phase of `elapsed` within `duration`, clamped to `[0, 1]`
///
/// A zero or negative duration means the phase is already complete.
pub fn phase_fraction(elapsed: f64, duration: f64) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    utils::clamp((elapsed / duration) as f32, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_vec3_endpoints_and_midpoint() {
        let a = Vec3::new(-5.0, 0.0, -8.0);
        let b = Vec3::new(5.0, 0.0, -8.0);
        assert_relative_eq!(lerp_vec3(&a, &b, 0.0), a);
        assert_relative_eq!(lerp_vec3(&a, &b, 1.0), b);
        assert_relative_eq!(lerp_vec3(&a, &b, 0.5), Vec3::new(0.0, 0.0, -8.0));
    }

    #[test]
    fn test_lerp_vec3_identical_points() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(lerp_vec3(&a, &a, 0.37), a, epsilon = 1e-6);
    }

    #[test]
    fn test_angle_lerp_wraps_shortest_path() {
        let mid = angle_lerp(170.0, -170.0, 0.5);
        assert!((mid.abs() - 180.0).abs() < 1e-4, "got {mid}");

        let mid = angle_lerp(-170.0, 170.0, 0.5);
        assert!((mid.abs() - 180.0).abs() < 1e-4, "got {mid}");
    }

    #[test]
    fn test_angle_lerp_patrol_corners() {
        // 90 -> 0 turns right by 90
        assert_relative_eq!(angle_lerp(90.0, 0.0, 0.5), 45.0);
        // -180 -> 90 is a 90 degree turn through -270, not a 270 degree sweep
        assert_relative_eq!(angle_lerp(-180.0, 90.0, 1.0), -270.0);
        assert_relative_eq!(angle_lerp(-180.0, 90.0, 0.5), -225.0);
    }

    #[test]
    fn test_wrap_degrees_range() {
        assert_relative_eq!(wrap_degrees(180.0), 180.0);
        assert_relative_eq!(wrap_degrees(-180.0), 180.0);
        assert_relative_eq!(wrap_degrees(270.0), -90.0);
        assert_relative_eq!(wrap_degrees(-270.0), 90.0);
        assert_relative_eq!(wrap_degrees(720.0), 0.0);
    }

    #[test]
    fn test_phase_fraction_degenerate_duration() {
        assert_eq!(phase_fraction(0.0, 0.0), 1.0);
        assert_eq!(phase_fraction(3.0, -1.0), 1.0);
        assert_eq!(phase_fraction(-1.0, 4.0), 0.0);
        assert_eq!(phase_fraction(2.0, 4.0), 0.5);
        assert_eq!(phase_fraction(9.0, 4.0), 1.0);
    }
}
