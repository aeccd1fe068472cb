//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive the scene from outside: scripted input,
/// recording, or a real window's event loop.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the scene animates.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Handle application events
    fn handle_event(&mut self, engine: &mut Engine, event: AppEvent) -> Result<(), AppError> {
        // Default implementation forwards to engine
        engine.handle_event(event);
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once after the last frame.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Scene controls an application can trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// Flip the manual dance override
    ToggleDanceOverride,
    /// Start or stop the patrol robot
    TogglePatrol,
    /// Set the general light intensity (percent)
    GeneralLightIntensity(f32),
    /// Set the spotlight intensity (percent)
    SpotlightIntensity(f32),
    /// Stop the frame loop
    Quit,
}
