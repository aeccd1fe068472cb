//! # Spacecraft Engine
//!
//! A hierarchical scene graph with time-driven animation controllers, built
//! around a small spacecraft room with two robots.
//!
//! ## Features
//!
//! - **Scene Graph**: arena-backed transform tree with separate update and draw passes
//! - **Declarative Assembly**: hierarchies declared by name through a builder
//! - **Animation**: pausable idle dance, waypoint patrol with a sweeping spotlight
//! - **Proximity Activation**: the dancer wakes when the patrol robot comes near
//! - **Configuration**: every constant tunable through TOML or RON files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spacecraft_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.handle_event(AppEvent::ToggleDanceOverride);
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::default();
//!     let mut factory = LoggingRenderableFactory;
//!     let mut engine = Engine::new(&config, &mut factory, Box::new(SystemClock::new()))?;
//!     engine.run(&mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

// Scene and animation
pub mod animation;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        animation::{AnimationClock, IdleController, PatrolController, ProximityActivation},
        core::config::{ApplicationConfig, Config, EngineConfig},
        foundation::{
            math::{Mat4, Mat4Ext, Vec3},
            time::{Clock, ManualClock, SystemClock, Timer},
        },
        render::{Light, LightingEnvironment},
        scene::{
            LoggingRenderableFactory, NullRenderable, PartDescriptor, Renderable, RenderableFactory, SceneError,
            SceneGraph, SceneGraphBuilder, SpacecraftScene,
        },
        AppError, AppEvent, Application, Engine, EngineError,
    };
}
