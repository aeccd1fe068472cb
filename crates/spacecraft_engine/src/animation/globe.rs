//! Constant-rate spins of scene props

use crate::foundation::math::{Mat4, Mat4Ext};

/// Spin about the Y axis at a fixed rate of scene time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    degrees_per_second: f32,
}

impl Spin {
    /// Spin at `degrees_per_second`; negative turns clockwise seen from above
    pub fn new(degrees_per_second: f32) -> Self {
        Self { degrees_per_second }
    }

    /// Spin rate
    pub fn rate(&self) -> f32 {
        self.degrees_per_second
    }

    /// Angle after `elapsed` seconds, wrapped to `[0, 360)`
    #[allow(clippy::cast_possible_truncation)]
    pub fn angle(&self, elapsed: f64) -> f32 {
        (elapsed * f64::from(self.degrees_per_second)).rem_euclid(360.0) as f32
    }

    /// Rotation after `elapsed` seconds
    pub fn transform(&self, elapsed: f64) -> Mat4 {
        Mat4::rotation_y_deg(self.angle(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_globe_spin() {
        let spin = Spin::new(-50.0);
        assert_relative_eq!(spin.angle(0.0), 0.0);
        assert_relative_eq!(spin.angle(1.0), 310.0);
        assert_relative_eq!(spin.transform(1.0), Mat4::rotation_y_deg(-50.0), epsilon = 1e-5);
    }
}
