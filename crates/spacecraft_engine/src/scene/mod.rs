//! Scene graph and scene assembly
//!
//! ## Architecture
//!
//! ```text
//! SceneGraphBuilder (declarations)
//!      ↓
//! SceneGraph (arena of nodes, world transform pass, draw pass)
//!      ↓
//! Renderable leaves (supplied by a RenderableFactory)
//! ```
//!
//! Animation controllers write local transforms between passes; the
//! [`SpacecraftScene`] owns the graph and runs a whole frame.

mod builder;
mod renderable;
mod scene_graph;
mod spacecraft;

pub use builder::{NodeSpec, SceneGraphBuilder};
pub use renderable::{
    LoggingRenderable, LoggingRenderableFactory, NullRenderable, PartDescriptor, Primitive, Renderable,
    RenderableFactory,
};
pub use scene_graph::{NodeKey, NodeKind, SceneError, SceneGraph, SceneNode};
pub use spacecraft::SpacecraftScene;
