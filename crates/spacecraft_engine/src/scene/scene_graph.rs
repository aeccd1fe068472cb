//! Hierarchical transform scene graph
//!
//! Nodes live in a [`SlotMap`] arena and are addressed by [`NodeKey`]. Each node
//! owns an ordered list of children, so the structure is a strict tree rooted at
//! [`SceneGraph::root`]. A node carries an optional local transform (absent
//! means identity) and caches the world transform computed by the last
//! [`SceneGraph::update`].
//!
//! Transform propagation and drawing are separate passes. Controllers write
//! local transforms for a whole frame first, then one `update()` recomputes
//! every world transform, then `draw()` hands those cached transforms to the
//! leaf renderables.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::scene::renderable::Renderable;

new_key_type! {
    struct NodeSlot;
}

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a node in a [`SceneGraph`]
///
/// Keys remember which graph issued them, so a key from another graph is
/// rejected even when its slot happens to be occupied here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    slot: NodeSlot,
    graph: u64,
}

/// Structural errors raised while building or mutating the graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Key does not belong to this graph
    #[error("Unknown scene node: {0:?}")]
    UnknownNode(NodeKey),

    /// Node exists but has not been attached under the root
    #[error("Scene node '{0}' is not attached to the scene root")]
    Detached(String),

    /// Child already has a parent
    #[error("Scene node '{child}' already has parent '{parent}'")]
    AlreadyParented {
        /// Child name
        child: String,
        /// Existing parent name
        parent: String,
    },

    /// Attaching would make a node its own ancestor
    #[error("Adding '{child}' under '{parent}' would create a cycle")]
    CycleDetected {
        /// Requested parent name
        parent: String,
        /// Requested child name
        child: String,
    },

    /// The root can never be a child
    #[error("The scene root cannot be added as a child")]
    RootAsChild,

    /// Two nodes share a name
    #[error("Duplicate scene node name: {0}")]
    DuplicateName(String),

    /// A declared parent name was never declared
    #[error("Unknown parent '{parent}' for scene node '{child}'")]
    UnknownParent {
        /// Missing parent name
        parent: String,
        /// Child that referenced it
        child: String,
    },

    /// Lookup by name failed
    #[error("No scene node named '{0}'")]
    MissingNode(String),
}

/// What a node does during the draw pass
pub enum NodeKind {
    /// Pure grouping/transform node
    Group,
    /// Node bound to a renderable
    Leaf(Box<dyn Renderable>),
}

impl NodeKind {
    /// Whether this node is bound to a renderable
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Leaf(_))
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Group => f.write_str("Group"),
            NodeKind::Leaf(_) => f.write_str("Leaf(<renderable>)"),
        }
    }
}

/// A single node of the hierarchy
#[derive(Debug)]
pub struct SceneNode {
    name: String,
    kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    local_transform: Option<Mat4>,
    world_transform: Mat4,
    attached: bool,
}

impl SceneNode {
    fn new(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            parent: None,
            children: Vec::new(),
            local_transform: None,
            world_transform: Mat4::identity(),
            attached: false,
        }
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node kind
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent, if attached to one
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Local transform, `None` meaning identity
    pub fn local_transform(&self) -> Option<&Mat4> {
        self.local_transform.as_ref()
    }

    /// World transform from the last update
    pub fn world_transform(&self) -> &Mat4 {
        &self.world_transform
    }
}

/// Arena-backed scene graph with a single root
#[derive(Debug)]
pub struct SceneGraph {
    id: u64,
    nodes: SlotMap<NodeSlot, SceneNode>,
    names: HashMap<String, NodeKey>,
    root: NodeKey,
}

impl SceneGraph {
    /// Create a graph holding only a root group named `root_name`
    pub fn new(root_name: impl Into<String>) -> Self {
        let root_name = root_name.into();
        let id = NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed);
        let mut nodes = SlotMap::with_key();
        let mut root_node = SceneNode::new(root_name.clone(), NodeKind::Group);
        root_node.attached = true;
        let root = NodeKey {
            slot: nodes.insert(root_node),
            graph: id,
        };

        let mut names = HashMap::new();
        names.insert(root_name, root);

        Self { id, nodes, names, root }
    }

    /// Root node key
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of nodes below the root, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Whether the graph holds nothing but its root
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of attached leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|node| node.attached && node.kind.is_leaf())
            .count()
    }

    /// Allocate a detached node
    ///
    /// The node takes part in `update()`/`draw()` only once it is reachable
    /// from the root through [`add_child`](Self::add_child).
    pub fn create_node(&mut self, name: impl Into<String>, kind: NodeKind) -> Result<NodeKey, SceneError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(SceneError::DuplicateName(name));
        }
        let key = NodeKey {
            slot: self.nodes.insert(SceneNode::new(name.clone(), kind)),
            graph: self.id,
        };
        self.names.insert(name, key);
        Ok(key)
    }

    /// Append `child` to `parent`'s children
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneError> {
        let child_node = self.existing(child)?;
        self.existing(parent)?;
        if child == self.root {
            return Err(SceneError::RootAsChild);
        }
        if let Some(existing) = child_node.parent {
            return Err(SceneError::AlreadyParented {
                child: child_node.name.clone(),
                parent: self.nodes[existing.slot].name.clone(),
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::CycleDetected {
                parent: self.nodes[parent.slot].name.clone(),
                child: self.nodes[child.slot].name.clone(),
            });
        }

        self.nodes[child.slot].parent = Some(parent);
        self.nodes[parent.slot].children.push(child);

        if self.nodes[parent.slot].attached {
            self.mark_attached(child);
        }
        Ok(())
    }

    /// Replace a node's local transform
    ///
    /// World transforms are not recomputed until the next `update()`.
    pub fn set_local_transform(&mut self, node: NodeKey, transform: Mat4) -> Result<(), SceneError> {
        self.attached_node_mut(node)?.local_transform = Some(transform);
        Ok(())
    }

    /// Reset a node's local transform to identity
    pub fn clear_local_transform(&mut self, node: NodeKey) -> Result<(), SceneError> {
        self.attached_node_mut(node)?.local_transform = None;
        Ok(())
    }

    /// Recompute every attached node's world transform, top-down
    pub fn update(&mut self) {
        let mut stack = vec![(self.root, Mat4::identity())];
        while let Some((key, parent_world)) = stack.pop() {
            let node = &mut self.nodes[key.slot];
            node.world_transform = match &node.local_transform {
                Some(local) => parent_world * local,
                None => parent_world,
            };
            let world = node.world_transform;
            // Reverse push keeps pre-order traversal in insertion order
            stack.extend(node.children.iter().rev().map(|child| (*child, world)));
        }
    }

    /// Hand every attached leaf its cached world transform
    pub fn draw(&mut self) {
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let node = &mut self.nodes[key.slot];
            if let NodeKind::Leaf(renderable) = &mut node.kind {
                renderable.render(&node.world_transform);
            }
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Look up a node by name
    pub fn find(&self, name: &str) -> Option<NodeKey> {
        self.names.get(name).copied()
    }

    /// Look up a node by name, failing if absent
    pub fn node(&self, name: &str) -> Result<NodeKey, SceneError> {
        self.find(name).ok_or_else(|| SceneError::MissingNode(name.to_string()))
    }

    /// Borrow a node
    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.existing(key).ok()
    }

    /// Node name
    pub fn name(&self, key: NodeKey) -> Result<&str, SceneError> {
        Ok(self.existing(key)?.name())
    }

    /// Parent of a node
    pub fn parent(&self, key: NodeKey) -> Result<Option<NodeKey>, SceneError> {
        Ok(self.existing(key)?.parent)
    }

    /// Children of a node in insertion order
    pub fn children(&self, key: NodeKey) -> Result<&[NodeKey], SceneError> {
        Ok(self.existing(key)?.children())
    }

    /// Local transform of a node (identity if unset)
    pub fn local_transform(&self, key: NodeKey) -> Result<Mat4, SceneError> {
        Ok(self.existing(key)?.local_transform.unwrap_or_else(Mat4::identity))
    }

    /// World transform from the last update
    pub fn world_transform(&self, key: NodeKey) -> Result<Mat4, SceneError> {
        Ok(self.existing(key)?.world_transform)
    }

    /// World-space origin of a node from the last update
    pub fn world_position(&self, key: NodeKey) -> Result<Vec3, SceneError> {
        Ok(self.existing(key)?.world_transform.translation_part())
    }

    /// Whether a node is reachable from the root
    pub fn is_attached(&self, key: NodeKey) -> bool {
        self.get(key).is_some_and(|node| node.attached)
    }

    fn existing(&self, key: NodeKey) -> Result<&SceneNode, SceneError> {
        if key.graph != self.id {
            return Err(SceneError::UnknownNode(key));
        }
        self.nodes.get(key.slot).ok_or(SceneError::UnknownNode(key))
    }

    fn attached_node_mut(&mut self, key: NodeKey) -> Result<&mut SceneNode, SceneError> {
        if key.graph != self.id {
            return Err(SceneError::UnknownNode(key));
        }
        let node = self.nodes.get_mut(key.slot).ok_or(SceneError::UnknownNode(key))?;
        if !node.attached {
            return Err(SceneError::Detached(node.name.clone()));
        }
        Ok(node)
    }

    fn is_ancestor_or_self(&self, candidate: NodeKey, mut node: NodeKey) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.nodes[node.slot].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn mark_attached(&mut self, subtree: NodeKey) {
        let mut stack = vec![subtree];
        while let Some(key) = stack.pop() {
            let node = &mut self.nodes[key.slot];
            node.attached = true;
            stack.extend(node.children.iter().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPSILON: f32 = 1e-5;

    struct Recorder {
        label: &'static str,
        log: Rc<RefCell<Vec<(&'static str, Mat4)>>>,
    }

    impl Renderable for Recorder {
        fn render(&mut self, world_transform: &Mat4) {
            self.log.borrow_mut().push((self.label, *world_transform));
        }
    }

    fn leaf(label: &'static str, log: &Rc<RefCell<Vec<(&'static str, Mat4)>>>) -> NodeKind {
        NodeKind::Leaf(Box::new(Recorder { label, log: Rc::clone(log) }))
    }

    fn chain(graph: &mut SceneGraph, depth: usize) -> Vec<NodeKey> {
        let mut keys = Vec::new();
        let mut parent = graph.root();
        for i in 0..depth {
            let key = graph.create_node(format!("n{i}"), NodeKind::Group).unwrap();
            graph.add_child(parent, key).unwrap();
            let local = Mat4::translation_xyz(1.0, i as f32 * 0.5, 0.0) * Mat4::rotation_y_deg(15.0 * i as f32);
            graph.set_local_transform(key, local).unwrap();
            keys.push(key);
            parent = key;
        }
        keys
    }

    #[test]
    fn test_world_is_parent_world_times_local() {
        let mut graph = SceneGraph::new("root");
        let keys = chain(&mut graph, 6);

        // Side branch to check siblings as well
        let branch = graph.create_node("branch", NodeKind::Group).unwrap();
        graph.add_child(keys[2], branch).unwrap();
        graph.set_local_transform(branch, Mat4::scaling_xyz(2.0, 1.0, 0.5)).unwrap();

        graph.update();

        for key in keys.iter().copied().chain(std::iter::once(branch)) {
            let parent = graph.parent(key).unwrap().unwrap();
            let expected = graph.world_transform(parent).unwrap() * graph.local_transform(key).unwrap();
            assert_relative_eq!(graph.world_transform(key).unwrap(), expected, epsilon = EPSILON);
        }
        assert_eq!(graph.world_transform(graph.root()).unwrap(), Mat4::identity());
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut graph = SceneGraph::new("root");
        let keys = chain(&mut graph, 4);
        graph.update();
        let first: Vec<Mat4> = keys.iter().map(|k| graph.world_transform(*k).unwrap()).collect();
        graph.update();
        let second: Vec<Mat4> = keys.iter().map(|k| graph.world_transform(*k).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_set_local_transform_defers_until_update() {
        let mut graph = SceneGraph::new("root");
        let keys = chain(&mut graph, 2);
        graph.update();
        let before = graph.world_position(keys[1]).unwrap();

        graph.set_local_transform(keys[0], Mat4::translation_xyz(10.0, 0.0, 0.0)).unwrap();
        assert_eq!(graph.world_position(keys[1]).unwrap(), before);

        graph.update();
        assert_relative_eq!(graph.world_position(keys[0]).unwrap(), Vec3::new(10.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_draw_visits_leaves_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = SceneGraph::new("root");
        let group = graph.create_node("group", NodeKind::Group).unwrap();
        let a = graph.create_node("a", leaf("a", &log)).unwrap();
        let b = graph.create_node("b", leaf("b", &log)).unwrap();
        let c = graph.create_node("c", leaf("c", &log)).unwrap();
        graph.add_child(graph.root(), group).unwrap();
        graph.add_child(group, a).unwrap();
        graph.add_child(a, b).unwrap();
        graph.add_child(group, c).unwrap();
        graph.set_local_transform(group, Mat4::translation_xyz(0.0, 2.0, 0.0)).unwrap();

        graph.update();
        graph.draw();

        let draws = log.borrow();
        let labels: Vec<&str> = draws.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        for (_, world) in draws.iter() {
            assert_relative_eq!(world.translation_part(), Vec3::new(0.0, 2.0, 0.0), epsilon = EPSILON);
        }
        assert_eq!(graph.leaf_count(), 3);
    }

    #[test]
    fn test_draw_does_not_recompute() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = SceneGraph::new("root");
        let a = graph.create_node("a", leaf("a", &log)).unwrap();
        graph.add_child(graph.root(), a).unwrap();
        graph.update();

        graph.set_local_transform(a, Mat4::translation_xyz(5.0, 0.0, 0.0)).unwrap();
        graph.draw();
        assert_eq!(log.borrow()[0].1, Mat4::identity());
    }

    #[test]
    fn test_detached_nodes_are_skipped_and_rejected() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = SceneGraph::new("root");
        let loose = graph.create_node("loose", leaf("loose", &log)).unwrap();

        assert_eq!(
            graph.set_local_transform(loose, Mat4::identity()),
            Err(SceneError::Detached("loose".to_string()))
        );
        graph.update();
        graph.draw();
        assert!(log.borrow().is_empty());
        assert_eq!(graph.leaf_count(), 0);

        // Attaching a parent later attaches the whole subtree
        let holder = graph.create_node("holder", NodeKind::Group).unwrap();
        graph.add_child(holder, loose).unwrap();
        assert!(!graph.is_attached(loose));
        graph.add_child(graph.root(), holder).unwrap();
        assert!(graph.is_attached(loose));
        assert!(graph.set_local_transform(loose, Mat4::identity()).is_ok());
    }

    #[test]
    fn test_foreign_key_is_rejected() {
        let mut other = SceneGraph::new("other");
        let mut foreign = other.root();
        for i in 0..3 {
            foreign = other.create_node(format!("x{i}"), NodeKind::Group).unwrap();
        }

        let mut graph = SceneGraph::new("root");
        assert_eq!(
            graph.set_local_transform(foreign, Mat4::identity()),
            Err(SceneError::UnknownNode(foreign))
        );
    }

    #[test]
    fn test_foreign_key_on_occupied_slot_is_rejected() {
        let mut other = SceneGraph::new("other");
        let foreign = other.create_node("x", NodeKind::Group).unwrap();
        other.add_child(other.root(), foreign).unwrap();

        let mut graph = SceneGraph::new("root");
        let mine = graph.create_node("mine", NodeKind::Group).unwrap();
        graph.add_child(graph.root(), mine).unwrap();

        assert_eq!(
            graph.set_local_transform(foreign, Mat4::translation_xyz(9.0, 0.0, 0.0)),
            Err(SceneError::UnknownNode(foreign))
        );
        assert_eq!(graph.add_child(mine, foreign), Err(SceneError::UnknownNode(foreign)));
        assert!(graph.world_transform(foreign).is_err());
        assert!(!graph.is_attached(foreign));

        graph.update();
        assert_relative_eq!(graph.world_position(mine).unwrap(), Vec3::zeros(), epsilon = EPSILON);
    }

    #[test]
    fn test_len_excludes_root() {
        let mut graph = SceneGraph::new("root");
        assert_eq!(graph.len(), 0);
        assert!(graph.is_empty());

        graph.create_node("a", NodeKind::Group).unwrap();
        assert_eq!(graph.len(), 1);
        assert!(!graph.is_empty());
    }

    #[test]
    fn test_structural_errors() {
        let mut graph = SceneGraph::new("root");
        let a = graph.create_node("a", NodeKind::Group).unwrap();
        let b = graph.create_node("b", NodeKind::Group).unwrap();
        graph.add_child(graph.root(), a).unwrap();
        graph.add_child(a, b).unwrap();

        assert!(matches!(graph.add_child(b, a), Err(SceneError::AlreadyParented { .. })));
        assert_eq!(graph.add_child(b, graph.root()), Err(SceneError::RootAsChild));
        assert_eq!(graph.create_node("a", NodeKind::Group), Err(SceneError::DuplicateName("a".to_string())));

        let c = graph.create_node("c", NodeKind::Group).unwrap();
        let d = graph.create_node("d", NodeKind::Group).unwrap();
        graph.add_child(c, d).unwrap();
        assert!(matches!(graph.add_child(d, c), Err(SceneError::CycleDetected { .. })));
        assert!(matches!(graph.add_child(c, c), Err(SceneError::CycleDetected { .. })));
    }

    #[test]
    fn test_lookup_by_name() {
        let mut graph = SceneGraph::new("root");
        let a = graph.create_node("a", NodeKind::Group).unwrap();
        assert_eq!(graph.find("a"), Some(a));
        assert_eq!(graph.node("root").unwrap(), graph.root());
        assert_eq!(graph.node("zzz"), Err(SceneError::MissingNode("zzz".to_string())));
        assert_eq!(graph.name(a).unwrap(), "a");
    }

    #[test]
    fn test_clear_local_transform() {
        let mut graph = SceneGraph::new("root");
        let keys = chain(&mut graph, 1);
        graph.clear_local_transform(keys[0]).unwrap();
        graph.update();
        assert_eq!(graph.world_transform(keys[0]).unwrap(), Mat4::identity());
    }
}
