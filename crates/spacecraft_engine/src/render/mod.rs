//! # Rendering Data
//!
//! The engine does not own a graphics backend. Drawing goes through the
//! [`Renderable`](crate::scene::Renderable) leaves of the scene graph; this
//! module holds the backend-agnostic lighting data those renderers consume.

pub mod lighting;

pub use lighting::{Attenuation, Light, LightType, LightingEnvironment};
