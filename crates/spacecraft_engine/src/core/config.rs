//! # Unified Configuration System
//!
//! All tunables of the spacecraft scene in one serialisable tree. Defaults
//! reproduce the scene exactly as authored, so an empty or missing config file
//! still yields the reference animation.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging and frame loop pacing
//! - **Idle Animation Config**: frequencies and amplitudes of the dancing robot
//! - **Patrol Config**: waypoints, phase durations and the beam sweep
//! - **Proximity Config**: activation distance and manual override
//! - **Scene Config**: room dimensions, static placements and light defaults

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

// Re-export from the base config module
pub use crate::config::{Config, ConfigError};

/// # Engine Configuration
///
/// Core behaviour of the frame loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter, overridable with `RUST_LOG`
    pub log_level: String,
    /// Target FPS for frame pacing, `None` runs unpaced
    pub target_fps: Option<u32>,
    /// Stop after this many frames, `None` runs until stopped
    pub frame_limit: Option<u64>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            target_fps: Some(60),
            frame_limit: None,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set target FPS
    pub fn with_target_fps(mut self, fps: Option<u32>) -> Self {
        self.target_fps = fps;
        self
    }

    /// Set the frame limit
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.target_fps == Some(0) {
            return Err("Target FPS must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Idle Animation Configuration
///
/// Constants of the dancing robot's coupled periodic joint curves. Angles are
/// in degrees, frequencies in radians per second of effective time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleAnimationConfig {
    /// Base frequency of the torso, arms and head yaw
    pub speed: f32,
    /// Base amplitude shared by the slow sway terms
    pub amplitude: f32,
    /// Torso roll/yaw swing amplitude
    pub torso_swing: f32,
    /// Amplitude of the slow variation riding on several joints
    pub variation: f32,
    /// Multiplier of the upper segment's own bob term
    pub upper_bob_factor: f32,
    /// Multiplier of the head yaw/pitch amplitude
    pub head_factor: f32,
    /// Frequency of the ear flap
    pub ear_speed: f32,
    /// Multiplier of the raw ear amplitude before clamping
    pub ear_factor: f32,
    /// Lowest ear angle
    pub ear_min: f32,
    /// Highest ear angle
    pub ear_max: f32,
    /// Arm angle at the bottom of the swing
    pub arm_min: f32,
    /// Arm angle at the top of the swing
    pub arm_max: f32,
    /// Eye vertical scale when closed
    pub eye_min: f32,
    /// Eye vertical scale when open
    pub eye_max: f32,
    /// Blink frequency
    pub blink_speed: f32,
}

impl Default for IdleAnimationConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            amplitude: 15.0,
            torso_swing: 35.0,
            variation: 5.0,
            upper_bob_factor: 4.0,
            head_factor: 3.0,
            ear_speed: 1.5,
            ear_factor: 6.0,
            ear_min: 0.0,
            ear_max: 65.0,
            arm_min: 20.0,
            arm_max: 150.0,
            eye_min: 0.05,
            eye_max: 0.3,
            blink_speed: 1.0,
        }
    }
}

impl IdleAnimationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.ear_min > self.ear_max {
            return Err(format!("Ear range is inverted: [{}, {}]", self.ear_min, self.ear_max));
        }
        if self.eye_min > self.eye_max {
            return Err(format!("Eye scale range is inverted: [{}, {}]", self.eye_min, self.eye_max));
        }
        Ok(())
    }
}

/// How the beam sweep behaves while the patrol body is disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepPolicy {
    /// Beam keeps sweeping while the body stands still
    Continuous,
    /// Beam freezes with the body and resumes where it stopped
    PauseWithBody,
}

/// # Patrol Configuration
///
/// Waypoint loop of the mobile robot and its sweeping beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// Corner points visited in order, wrapping around
    pub waypoints: [Vec3; 4],
    /// Heading (degrees about Y) held after arriving at each waypoint
    pub headings: [f32; 4],
    /// Seconds spent moving between two waypoints
    pub move_duration: f64,
    /// Seconds spent turning at a waypoint
    pub rotation_duration: f64,
    /// Beam sweep rate in radians per second
    pub sweep_rate: f32,
    /// Height of the beam origin above the body position
    pub beam_height: f32,
    /// Beam behaviour while disabled
    pub sweep_policy: SweepPolicy,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            waypoints: [
                Vec3::new(-5.0, 0.0, -8.0),
                Vec3::new(5.0, 0.0, -8.0),
                Vec3::new(5.0, 0.0, 8.0),
                Vec3::new(-5.0, 0.0, 8.0),
            ],
            headings: [90.0, 0.0, -90.0, -180.0],
            move_duration: 4.0,
            rotation_duration: 1.0,
            sweep_rate: 2.0,
            beam_height: 1.46,
            sweep_policy: SweepPolicy::Continuous,
        }
    }
}

impl PatrolConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.move_duration.is_finite() || !self.rotation_duration.is_finite() {
            return Err("Patrol durations must be finite".to_string());
        }
        Ok(())
    }
}

/// # Proximity Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Inclusive activation distance between the two robots
    pub threshold: f32,
    /// Start with the manual dance override engaged
    pub override_active: bool,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold: 6.8,
            override_active: false,
        }
    }
}

/// # Scene Configuration
///
/// Room dimensions and placements of the static and slowly spinning parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Wall thickness
    pub wall_thickness: f32,
    /// Wall height
    pub wall_height: f32,
    /// Length of the back wall (room width along X)
    pub back_wall_length: f32,
    /// Length of the side walls (room depth along Z)
    pub side_wall_length: f32,
    /// Gap between the patrol path and the walls
    pub path_gap_from_wall: f32,
    /// Gap between the globe and the patrol path
    pub globe_distance_from_path: f32,
    /// Globe spin in degrees per second
    pub globe_spin_rate: f32,
    /// Skybox spin in degrees per second
    pub skybox_spin_rate: f32,
    /// Base position of the dancing robot
    pub dancer_position: Vec3,
    /// Position of the general light
    pub general_light_position: Vec3,
    /// Initial general light intensity (0..1)
    pub general_light_intensity: f32,
    /// Initial spotlight intensity (0..1)
    pub spotlight_intensity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            wall_thickness: 0.2,
            wall_height: 7.5,
            back_wall_length: 15.0,
            side_wall_length: 22.5,
            path_gap_from_wall: 1.75,
            globe_distance_from_path: 4.0,
            globe_spin_rate: -50.0,
            skybox_spin_rate: 10.0,
            dancer_position: Vec3::new(-2.75, 0.1, -4.0),
            general_light_position: Vec3::new(0.0, 3.0, 0.0),
            general_light_intensity: 0.5,
            spotlight_intensity: 1.0,
        }
    }
}

impl SceneConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.wall_thickness <= 0.0 || self.wall_height <= 0.0 {
            return Err("Walls must have positive thickness and height".to_string());
        }
        if self.back_wall_length <= 0.0 || self.side_wall_length <= 0.0 {
            return Err("Room dimensions must be positive".to_string());
        }
        Ok(())
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
/// This is the main configuration structure applications should use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Dancing robot configuration
    pub idle: IdleAnimationConfig,
    /// Patrol robot configuration
    pub patrol: PatrolConfig,
    /// Proximity activation configuration
    pub proximity: ProximityConfig,
    /// Room and static scene configuration
    pub scene: SceneConfig,
}

impl Config for ApplicationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate().map_err(ConfigError::Invalid)?;
        self.idle.validate().map_err(ConfigError::Invalid)?;
        self.patrol.validate().map_err(ConfigError::Invalid)?;
        self.scene.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}
