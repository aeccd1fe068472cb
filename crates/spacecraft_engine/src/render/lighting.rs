//! Scene lighting data
//!
//! Lights are plain data handed to whatever renders the scene. The room has
//! two: a general point light overhead and the spotlight carried by the patrol
//! robot, which follows the beam sweep every frame.

use crate::animation::patrol::BeamState;
use crate::core::config::SceneConfig;
use crate::foundation::math::{utils, Vec3};

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Point light (like a lightbulb)
    Point,
    /// Spot light (like a flashlight)
    Spot,
}

/// Distance attenuation factors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.14,
            quadratic: 0.07,
        }
    }
}

/// Light source
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Light type
    pub light_type: LightType,
    /// Light position
    pub position: Vec3,
    /// Light direction (spot lights only)
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Light intensity, `[0, 1]`
    pub intensity: f32,
    /// Cosine of the inner cone angle
    pub cutoff: f32,
    /// Cosine of the outer cone angle
    pub outer_cutoff: f32,
    /// Distance attenuation
    pub attenuation: Attenuation,
}

impl Light {
    /// Default inner cone cosine
    pub const CUTOFF: f32 = 0.9976;
    /// Default outer cone cosine
    pub const OUTER_CUTOFF: f32 = 0.953;

    /// Create a point light
    pub fn point(position: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Point,
            position,
            direction: Vec3::zeros(),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity,
            cutoff: Self::CUTOFF,
            outer_cutoff: Self::OUTER_CUTOFF,
            attenuation: Attenuation::default(),
        }
    }

    /// Create a spot light
    pub fn spot(position: Vec3, direction: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Spot,
            direction,
            ..Self::point(position, intensity)
        }
    }

    /// Set intensity from a percentage, clamped to `0..=100`
    pub fn set_intensity_percent(&mut self, percent: f32) {
        self.intensity = utils::clamp(percent, 0.0, 100.0) / 100.0;
    }

    /// Get position as array for shader upload
    pub fn position_array(&self) -> [f32; 3] {
        [self.position.x, self.position.y, self.position.z]
    }

    /// Get direction as array for shader upload
    pub fn direction_array(&self) -> [f32; 3] {
        [self.direction.x, self.direction.y, self.direction.z]
    }
}

/// The room's two lights
#[derive(Debug, Clone, PartialEq)]
pub struct LightingEnvironment {
    general: Light,
    spotlight: Light,
}

impl LightingEnvironment {
    /// Create the lights from scene configuration, the spotlight aimed along `beam`
    pub fn new(config: &SceneConfig, beam: &BeamState) -> Self {
        Self {
            general: Light::point(config.general_light_position, config.general_light_intensity),
            spotlight: Light::spot(beam.position, beam.direction, config.spotlight_intensity),
        }
    }

    /// General point light
    pub fn general(&self) -> &Light {
        &self.general
    }

    /// Spotlight carried by the patrol robot
    pub fn spotlight(&self) -> &Light {
        &self.spotlight
    }

    /// Both lights, general first
    pub fn lights(&self) -> [&Light; 2] {
        [&self.general, &self.spotlight]
    }

    /// Move the spotlight along with the beam
    pub fn follow_beam(&mut self, beam: &BeamState) {
        self.spotlight.position = beam.position;
        self.spotlight.direction = beam.direction;
    }

    /// General light intensity from a percentage
    pub fn set_general_intensity(&mut self, percent: f32) {
        self.general.set_intensity_percent(percent);
    }

    /// Spotlight intensity from a percentage
    pub fn set_spotlight_intensity(&mut self, percent: f32) {
        self.spotlight.set_intensity_percent(percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PatrolConfig;
    use approx::assert_relative_eq;

    fn environment() -> LightingEnvironment {
        let patrol = PatrolConfig::default();
        let beam = BeamState::at(0.0, patrol.waypoints[0], &patrol);
        LightingEnvironment::new(&SceneConfig::default(), &beam)
    }

    #[test]
    fn test_default_lights() {
        let lights = environment();
        let [general, spot] = lights.lights();
        assert_eq!(general.light_type, LightType::Point);
        assert_relative_eq!(general.position, Vec3::new(0.0, 3.0, 0.0));
        assert_relative_eq!(general.intensity, 0.5);
        assert_eq!(spot.light_type, LightType::Spot);
        assert_relative_eq!(spot.intensity, 1.0);
        assert_relative_eq!(spot.cutoff, 0.9976);
        assert_relative_eq!(spot.attenuation.quadratic, 0.07);
    }

    #[test]
    fn test_intensity_percent_clamps() {
        let mut lights = environment();
        lights.set_general_intensity(25.0);
        assert_relative_eq!(lights.general().intensity, 0.25);
        lights.set_general_intensity(150.0);
        assert_relative_eq!(lights.general().intensity, 1.0);
        lights.set_spotlight_intensity(-10.0);
        assert_relative_eq!(lights.spotlight().intensity, 0.0);
    }

    #[test]
    fn test_spotlight_follows_beam() {
        let mut lights = environment();
        let patrol = PatrolConfig::default();
        let beam = BeamState::at(1.0, Vec3::new(5.0, 0.0, -8.0), &patrol);
        lights.follow_beam(&beam);
        assert_relative_eq!(lights.spotlight().position, Vec3::new(5.0, 1.46, -8.0));
        assert_relative_eq!(lights.spotlight().direction, beam.direction);
        assert_eq!(lights.spotlight().direction_array()[1], -1.0);
    }
}
