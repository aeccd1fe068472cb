//! Math utilities and types
//!
//! Provides the vector and homogeneous matrix types used by the scene graph and
//! the animation controllers. Angles handed to the transform builders are in
//! degrees, matching how the animation curves are authored.

pub use nalgebra::{Matrix4, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 homogeneous transform matrix
pub type Mat4 = Matrix4<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    ///
    /// NaN input collapses to `min` so a degenerate ratio never leaks into a pose.
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value.is_nan() || value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

/// Transform builders on `Mat4`
///
/// Composition is plain matrix multiplication: in `a * b` the right-hand
/// transform is applied to a point first.
pub trait Mat4Ext {
    /// Translation by `offset`
    fn translation(offset: Vec3) -> Mat4;

    /// Translation by components
    fn translation_xyz(x: f32, y: f32, z: f32) -> Mat4;

    /// Rotation about the X axis, angle in degrees
    fn rotation_x_deg(degrees: f32) -> Mat4;

    /// Rotation about the Y axis, angle in degrees
    fn rotation_y_deg(degrees: f32) -> Mat4;

    /// Rotation about the Z axis, angle in degrees
    fn rotation_z_deg(degrees: f32) -> Mat4;

    /// Rotation about an arbitrary axis, angle in degrees
    ///
    /// A zero-length axis yields the identity.
    fn rotation_axis_deg(axis: Vec3, degrees: f32) -> Mat4;

    /// Non-uniform scale
    fn scaling(factors: Vec3) -> Mat4;

    /// Non-uniform scale by components
    fn scaling_xyz(x: f32, y: f32, z: f32) -> Mat4;

    /// Translation column of a homogeneous transform
    fn translation_part(&self) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn translation(offset: Vec3) -> Mat4 {
        Mat4::new_translation(&offset)
    }

    fn translation_xyz(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_translation(&Vec3::new(x, y, z))
    }

    fn rotation_x_deg(degrees: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), utils::deg_to_rad(degrees))
    }

    fn rotation_y_deg(degrees: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(degrees))
    }

    fn rotation_z_deg(degrees: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), utils::deg_to_rad(degrees))
    }

    fn rotation_axis_deg(axis: Vec3, degrees: f32) -> Mat4 {
        match Unit::try_new(axis, f32::EPSILON) {
            Some(axis) => Mat4::from_axis_angle(&axis, utils::deg_to_rad(degrees)),
            None => Mat4::identity(),
        }
    }

    fn scaling(factors: Vec3) -> Mat4 {
        Mat4::new_nonuniform_scaling(&factors)
    }

    fn scaling_xyz(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_nonuniform_scaling(&Vec3::new(x, y, z))
    }

    fn translation_part(&self) -> Vec3 {
        Vec3::new(self.m14, self.m24, self.m34)
    }
}
