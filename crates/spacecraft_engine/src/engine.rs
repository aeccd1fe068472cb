//! Core engine implementation

use std::time::Duration;

use crate::{
    application::{AppEvent, Application},
    core::config::{ApplicationConfig, Config, ConfigError, EngineConfig},
    foundation::time::{Clock, MonotonicClock, Timer},
    scene::{RenderableFactory, SceneError, SpacecraftScene},
};
use thiserror::Error;

/// Main engine struct
///
/// The engine owns the scene and runs the frame loop. Time is read once per
/// frame through a monotonic guard and handed to the scene.
pub struct Engine {
    /// The animated scene
    scene: SpacecraftScene,

    /// Time source, never running backwards
    clock: MonotonicClock<Box<dyn Clock>>,

    /// The single clock reading of the current frame
    frame_time: f64,

    /// Frame timing
    timer: Timer,

    /// Engine configuration
    config: EngineConfig,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(
        config: &ApplicationConfig,
        factory: &mut dyn RenderableFactory,
        clock: Box<dyn Clock>,
    ) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate()?;

        let clock = MonotonicClock::new(clock);
        let frame_time = clock.now();
        let scene = SpacecraftScene::new(config, factory, frame_time)?;

        Ok(Self {
            scene,
            clock,
            frame_time,
            timer: Timer::new(),
            config: config.engine.clone(),
            running: true,
        })
    }

    /// Run the main loop with the given application
    pub fn run<T: Application>(&mut self, app: &mut T) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");

        while self.running {
            let frame_start = self.clock.now();
            self.frame_time = frame_start;
            self.timer.tick(frame_start);

            let delta_time = self.timer.delta_time();
            app.update(self, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;
            if !self.running {
                break;
            }

            self.scene.frame(frame_start)?;

            if let Some(limit) = self.config.frame_limit {
                if self.timer.frame_count() >= limit {
                    log::info!("Frame limit of {limit} reached");
                    self.running = false;
                }
            }
            self.pace(frame_start);
        }

        app.cleanup(self);

        log::info!(
            "Engine shutdown complete after {} frames ({:.1} fps average)",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
        Ok(())
    }

    /// Read the clock and run one frame
    pub fn step(&mut self) -> Result<(), EngineError> {
        self.frame_time = self.clock.now();
        self.timer.tick(self.frame_time);
        self.scene.frame(self.frame_time)?;
        Ok(())
    }

    // Sleep off whatever is left of the frame budget
    fn pace(&self, frame_start: f64) {
        let Some(fps) = self.config.target_fps else {
            return;
        };
        let budget = 1.0 / f64::from(fps.max(1));
        let remaining = budget - (self.clock.now() - frame_start);
        if remaining > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(remaining));
        }
    }

    /// Handle an application event, stamped with the current frame's time
    pub fn handle_event(&mut self, event: AppEvent) {
        let now = self.frame_time;
        match event {
            AppEvent::ToggleDanceOverride => {
                self.scene.toggle_dance_override();
            }
            AppEvent::TogglePatrol => {
                self.scene.toggle_patrol(now);
            }
            AppEvent::GeneralLightIntensity(percent) => {
                self.scene.set_general_light_intensity(percent);
            }
            AppEvent::SpotlightIntensity(percent) => {
                self.scene.set_spotlight_intensity(percent);
            }
            AppEvent::Quit => self.quit(),
        }
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop will run another frame
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the scene
    pub fn scene(&self) -> &SpacecraftScene {
        &self.scene
    }

    /// Get mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut SpacecraftScene {
        &mut self.scene
    }

    /// Get frame timing
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Clock reading shared by everything in the current frame
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene construction or update failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}
