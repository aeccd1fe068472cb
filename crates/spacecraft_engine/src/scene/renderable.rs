//! Rendering capability consumed by scene-graph leaves
//!
//! The engine never draws anything itself. A leaf node owns a boxed
//! [`Renderable`] and hands it the node's world transform during the draw pass.
//! Renderables are produced by a [`RenderableFactory`] from a
//! [`PartDescriptor`], which names the primitive mesh and texture keys a
//! rendering backend would need without loading any of them here.

use crate::foundation::math::{Mat4, Mat4Ext};

/// Something that can draw itself at a world pose
pub trait Renderable {
    /// Draw once at `world_transform`
    fn render(&mut self, world_transform: &Mat4);
}

/// Primitive mesh a part is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Unit cube centred on the origin
    Cube,
    /// Unit sphere centred on the origin
    Sphere,
    /// Unit quad in the XZ plane
    Plane,
    /// Inward-facing cube sampled with a cube map
    SkyboxCube,
}

/// Description of one drawable part
#[derive(Debug, Clone, PartialEq)]
pub struct PartDescriptor {
    /// Part name, unique within a scene
    pub name: String,
    /// Mesh to draw
    pub primitive: Primitive,
    /// Texture keys, diffuse first
    pub textures: Vec<String>,
}

impl PartDescriptor {
    /// Create a descriptor
    pub fn new(name: impl Into<String>, primitive: Primitive, textures: &[&str]) -> Self {
        Self {
            name: name.into(),
            primitive,
            textures: textures.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// Creates renderables for parts while a scene is assembled
pub trait RenderableFactory {
    /// Create the renderable for `part`
    fn create(&mut self, part: &PartDescriptor) -> Box<dyn Renderable>;
}

impl<F> RenderableFactory for F
where
    F: FnMut(&PartDescriptor) -> Box<dyn Renderable>,
{
    fn create(&mut self, part: &PartDescriptor) -> Box<dyn Renderable> {
        self(part)
    }
}

/// Renderable that draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderable;

impl Renderable for NullRenderable {
    fn render(&mut self, _world_transform: &Mat4) {}
}

/// Renderable that traces every draw call through `log`
#[derive(Debug, Clone)]
pub struct LoggingRenderable {
    part: PartDescriptor,
    draw_count: u64,
}

impl LoggingRenderable {
    /// Wrap a part descriptor
    pub fn new(part: PartDescriptor) -> Self {
        Self { part, draw_count: 0 }
    }

    /// Number of draws so far
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }
}

impl Renderable for LoggingRenderable {
    fn render(&mut self, world_transform: &Mat4) {
        self.draw_count += 1;
        let position = world_transform.translation_part();
        log::trace!(
            "draw {} ({:?}, textures {:?}) at ({:.3}, {:.3}, {:.3})",
            self.part.name,
            self.part.primitive,
            self.part.textures,
            position.x,
            position.y,
            position.z
        );
    }
}

/// Factory producing [`LoggingRenderable`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRenderableFactory;

impl RenderableFactory for LoggingRenderableFactory {
    fn create(&mut self, part: &PartDescriptor) -> Box<dyn Renderable> {
        Box::new(LoggingRenderable::new(part.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_factory() {
        let mut created = Vec::new();
        let mut factory = |part: &PartDescriptor| -> Box<dyn Renderable> {
            created.push(part.name.clone());
            Box::new(NullRenderable)
        };
        let part = PartDescriptor::new("globe", Primitive::Sphere, &["earth_map", "earth_specular"]);
        let _ = factory.create(&part);
        assert_eq!(created, vec!["globe".to_string()]);
        assert_eq!(part.textures, vec!["earth_map".to_string(), "earth_specular".to_string()]);
    }

    #[test]
    fn test_logging_renderable_counts_draws() {
        let mut renderable = LoggingRenderable::new(PartDescriptor::new("bulb", Primitive::Sphere, &[]));
        renderable.render(&Mat4::identity());
        renderable.render(&Mat4::identity());
        assert_eq!(renderable.draw_count(), 2);
    }
}
