//! Declarative scene-graph construction
//!
//! Hierarchies are declared as a flat list of `(name, parent, transform)`
//! entries instead of hand-nested `add_child` calls:
//!
//! ```
//! use spacecraft_engine::foundation::math::{Mat4, Mat4Ext};
//! use spacecraft_engine::scene::{NullRenderable, SceneGraphBuilder};
//!
//! let graph = SceneGraphBuilder::new("scene")
//!     .group("robot", "scene", Mat4::translation_xyz(-2.75, 0.1, -4.0))
//!     .group("head pivot", "robot", None)
//!     .leaf("head", "head pivot", Mat4::scaling_xyz(1.0, 0.75, 0.4), Box::new(NullRenderable))
//!     .build()
//!     .unwrap();
//! assert_eq!(graph.len(), 3);
//! ```
//!
//! Entries are attached in declaration order, so a parent must be declared
//! before its children and sibling order follows the list.

use crate::foundation::math::Mat4;
use crate::scene::renderable::Renderable;
use crate::scene::scene_graph::{NodeKind, SceneError, SceneGraph};

/// One declared node
pub struct NodeSpec {
    /// Unique node name
    pub name: String,
    /// Name of an earlier-declared node (or the root)
    pub parent: String,
    /// Local transform, `None` meaning identity
    pub transform: Option<Mat4>,
    /// Renderable for leaf nodes
    pub renderable: Option<Box<dyn Renderable>>,
}

/// Builder collecting node declarations
pub struct SceneGraphBuilder {
    root_name: String,
    specs: Vec<NodeSpec>,
}

impl SceneGraphBuilder {
    /// Start a graph whose root is named `root_name`
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            specs: Vec::new(),
        }
    }

    /// Name of the root node
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Number of declared nodes (excluding the root)
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether nothing has been declared
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Declare a grouping node
    pub fn group(
        self,
        name: impl Into<String>,
        parent: impl Into<String>,
        transform: impl Into<Option<Mat4>>,
    ) -> Self {
        self.node(NodeSpec {
            name: name.into(),
            parent: parent.into(),
            transform: transform.into(),
            renderable: None,
        })
    }

    /// Declare a node bound to a renderable
    pub fn leaf(
        self,
        name: impl Into<String>,
        parent: impl Into<String>,
        transform: impl Into<Option<Mat4>>,
        renderable: Box<dyn Renderable>,
    ) -> Self {
        self.node(NodeSpec {
            name: name.into(),
            parent: parent.into(),
            transform: transform.into(),
            renderable: Some(renderable),
        })
    }

    /// Declare a node from a full spec
    pub fn node(mut self, spec: NodeSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Assemble the graph and compute initial world transforms
    pub fn build(self) -> Result<SceneGraph, SceneError> {
        let mut graph = SceneGraph::new(self.root_name);

        for spec in self.specs {
            let parent = graph.find(&spec.parent).ok_or_else(|| SceneError::UnknownParent {
                parent: spec.parent.clone(),
                child: spec.name.clone(),
            })?;
            let kind = match spec.renderable {
                Some(renderable) => NodeKind::Leaf(renderable),
                None => NodeKind::Group,
            };
            let key = graph.create_node(spec.name, kind)?;
            graph.add_child(parent, key)?;
            if let Some(transform) = spec.transform {
                graph.set_local_transform(key, transform)?;
            }
        }

        graph.update();
        log::debug!("Built scene graph with {} nodes ({} leaves)", graph.len(), graph.leaf_count());
        Ok(graph)
    }
}
