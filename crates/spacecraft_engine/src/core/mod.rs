//! # Core Engine Module
//!
//! Shared abstractions that the other subsystems depend on.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for the engine and the scene
//! - **Foundation**: Low-level utilities (math, time, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    EngineConfig,
    IdleAnimationConfig,
    PatrolConfig,
    ProximityConfig,
    SceneConfig,
    SweepPolicy,
    Config,
    ConfigError,
};
