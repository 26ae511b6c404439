//! Object tree builder for the figure explorer
//!
//! Walks a drawable's children recursively and produces a flat,
//! pre-order list of [`ExplorerNode`]s linked by [`NodeId`]. Each node keeps
//! a weak back-reference to the object it was built from, so a selection can
//! be found again by identity after the tree is rebuilt.
//!
//! ```text
//! Figure
//! +-- Axes - Line Plot
//! |   +-- Line2D - sin(x)
//! |   +-- Spine - left
//! |   +-- XAxis
//! |   |   +-- Text
//! ```
//!
//! The builder does not sort or de-duplicate: an object reachable from two
//! parents appears twice. A failing label or child enumeration aborts the
//! whole build.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::drawable::{refers_to, DrawableError, DrawableRef, WeakDrawable};

/// Maximum nesting depth before a build is treated as cyclic
pub const MAX_DEPTH: usize = 256;

/// Index into `ExplorerTree::nodes`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Id for a node index; `None` past the last usable id
    pub fn from_index(index: usize) -> Option<NodeId> {
        u32::try_from(index)
            .ok()
            .map(NodeId)
            .filter(|id| id.is_valid())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "NodeId(INVALID)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors produced while building a tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("reading the label of {type_name} at depth {depth} failed: {source}")]
    Label {
        type_name: String,
        depth: usize,
        #[source]
        source: DrawableError,
    },

    #[error("enumerating children of {type_name} at depth {depth} failed: {source}")]
    Children {
        type_name: String,
        depth: usize,
        #[source]
        source: DrawableError,
    },

    #[error("object graph under {type_name} exceeds {limit} levels; is it cyclic?")]
    TooDeep { type_name: String, limit: usize },

    #[error("object graph has more than {limit} objects")]
    TooLarge { limit: usize },
}

/// A single node of the explorer tree.
#[derive(Debug, Clone)]
pub struct ExplorerNode {
    pub id: NodeId,
    /// `"{type}"` or `"{type} - {label}"`
    pub label: String,
    pub type_name: String,
    /// Depth in the tree (0 for the root).
    pub depth: usize,
    /// Parent node (NodeId::INVALID for the root).
    pub parent: NodeId,
    pub children: Vec<NodeId>,
    object: WeakDrawable,
}

impl ExplorerNode {
    /// The underlying object, if it is still alive
    pub fn object(&self) -> Option<DrawableRef> {
        self.object.upgrade()
    }

    /// True when this node wraps `target`
    pub fn refers_to(&self, target: &DrawableRef) -> bool {
        refers_to(&self.object, target)
    }

    pub fn is_root(&self) -> bool {
        !self.parent.is_valid()
    }
}

/// Flat-storage explorer tree in depth-first pre-order.
///
/// `NodeId` is a direct index into `nodes`; node 0 is the root.
#[derive(Debug, Clone)]
pub struct ExplorerTree {
    nodes: Vec<ExplorerNode>,
}

impl ExplorerTree {
    /// Build a tree rooted at `root`
    pub fn build(root: &DrawableRef) -> Result<Self, TreeError> {
        let mut tree = Self { nodes: Vec::new() };
        tree.visit(root, NodeId::INVALID, 0)?;
        tracing::debug!("Built explorer tree with {} nodes", tree.nodes.len());
        Ok(tree)
    }

    fn visit(&mut self, obj: &DrawableRef, parent: NodeId, depth: usize) -> Result<NodeId, TreeError> {
        let type_name = obj.type_name();
        if depth >= MAX_DEPTH {
            return Err(TreeError::TooDeep {
                type_name,
                limit: MAX_DEPTH,
            });
        }

        let label = if depth == 0 {
            type_name.clone()
        } else {
            let label = obj.label().map_err(|source| TreeError::Label {
                type_name: type_name.clone(),
                depth,
                source,
            })?;
            if label.is_empty() {
                type_name.clone()
            } else {
                format!("{} - {}", type_name, label)
            }
        };

        let children = obj.children().map_err(|source| TreeError::Children {
            type_name: type_name.clone(),
            depth,
            source,
        })?;

        let id = NodeId::from_index(self.nodes.len()).ok_or(TreeError::TooLarge {
            limit: NodeId::INVALID.index(),
        })?;
        self.nodes.push(ExplorerNode {
            id,
            label,
            type_name,
            depth,
            parent,
            children: Vec::with_capacity(children.len()),
            object: Arc::downgrade(obj),
        });

        for child in &children {
            let child_id = self.visit(child, id, depth + 1)?;
            self.nodes[id.index()].children.push(child_id);
        }

        Ok(id)
    }

    /// Total number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&ExplorerNode> {
        self.nodes.first()
    }

    pub fn node(&self, id: NodeId) -> Option<&ExplorerNode> {
        self.nodes.get(id.index())
    }

    /// Nodes in depth-first pre-order
    pub fn iter(&self) -> impl Iterator<Item = &ExplorerNode> {
        self.nodes.iter()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ExplorerNode> {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.node(*c))
    }

    pub fn parent(&self, id: NodeId) -> Option<&ExplorerNode> {
        self.node(id).and_then(|n| self.node(n.parent))
    }

    /// Ids from the root down to the parent of `id`
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.node(id).map(|n| n.parent).unwrap_or(NodeId::INVALID);
        while let Some(node) = self.node(current) {
            path.push(node.id);
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// First node in pre-order that wraps `target`
    pub fn restore(&self, target: &DrawableRef) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.refers_to(target)).map(|n| n.id)
    }

    /// Indented text rendering for diagnostics
    pub fn render(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            out.push_str(&"  ".repeat(node.depth));
            out.push_str(&node.label);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::{Attribute, CallArgs, Drawable};
    use crate::types::Value;
    use proptest::prelude::*;
    use std::sync::RwLock;

    struct Node {
        name: &'static str,
        label: String,
        children: RwLock<Vec<DrawableRef>>,
    }

    impl Node {
        fn new(name: &'static str, label: &str, children: Vec<DrawableRef>) -> DrawableRef {
            Arc::new(Node {
                name,
                label: label.to_string(),
                children: RwLock::new(children),
            })
        }
    }

    impl Drawable for Node {
        fn type_name(&self) -> String {
            self.name.to_string()
        }
        fn label(&self) -> Result<String, DrawableError> {
            if self.label == "!" {
                Err(DrawableError::Failed("label unavailable".into()))
            } else {
                Ok(self.label.clone())
            }
        }
        fn children(&self) -> Result<Vec<DrawableRef>, DrawableError> {
            Ok(self.children.read().unwrap().clone())
        }
        fn attribute(&self, name: &str) -> Result<Attribute, DrawableError> {
            Err(DrawableError::NoAttribute {
                type_name: self.type_name(),
                name: name.to_string(),
            })
        }
        fn invoke(&self, name: &str, _args: CallArgs) -> Result<Value, DrawableError> {
            self.attribute(name).map(|_| Value::None)
        }
        fn assign(&self, name: &str, _value: Value) -> Result<(), DrawableError> {
            self.attribute(name).map(|_| ())
        }
    }

    #[test]
    fn test_node_id_from_index() {
        assert_eq!(NodeId::from_index(0), Some(NodeId::ROOT));
        assert_eq!(NodeId::from_index(7), Some(NodeId(7)));
        assert_eq!(NodeId::from_index(u32::MAX as usize), None);
        assert_eq!(NodeId::from_index(usize::MAX), None);
    }

    #[test]
    fn test_build_preorder_with_backrefs() {
        let a = Node::new("A", "", vec![]);
        let c = Node::new("C", "leaf", vec![]);
        let b = Node::new("B", "", vec![c.clone()]);
        let root = Node::new("Root", "ignored", vec![a.clone(), b.clone()]);

        let tree = ExplorerTree::build(&root).unwrap();
        let labels: Vec<_> = tree.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Root", "A", "B", "C - leaf"]);

        let nodes: Vec<_> = tree.iter().collect();
        assert!(nodes[0].refers_to(&root));
        assert!(nodes[1].refers_to(&a));
        assert!(nodes[2].refers_to(&b));
        assert!(nodes[3].refers_to(&c));
        assert_eq!(nodes[3].parent, NodeId(2));
        assert_eq!(nodes[3].depth, 2);
        assert_eq!(tree.ancestors(NodeId(3)), vec![NodeId(0), NodeId(2)]);
    }

    #[test]
    fn test_shared_child_appears_twice() {
        let shared = Node::new("S", "", vec![]);
        let root = Node::new(
            "Root",
            "",
            vec![
                Node::new("P", "", vec![shared.clone()]),
                Node::new("Q", "", vec![shared.clone()]),
            ],
        );
        let tree = ExplorerTree::build(&root).unwrap();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.iter().filter(|n| n.refers_to(&shared)).count(), 2);
        assert_eq!(tree.restore(&shared), Some(NodeId(2)));
    }

    #[test]
    fn test_label_failure_aborts_build() {
        let root = Node::new("Root", "", vec![Node::new("Bad", "!", vec![])]);
        assert!(matches!(
            ExplorerTree::build(&root),
            Err(TreeError::Label { depth: 1, .. })
        ));
    }

    #[test]
    fn test_cycle_hits_depth_guard() {
        let a = Arc::new(Node {
            name: "A",
            label: String::new(),
            children: RwLock::new(Vec::new()),
        });
        let as_ref: DrawableRef = a.clone();
        a.children.write().unwrap().push(as_ref.clone());

        assert!(matches!(
            ExplorerTree::build(&as_ref),
            Err(TreeError::TooDeep { limit: MAX_DEPTH, .. })
        ));
        a.children.write().unwrap().clear();
    }

    #[test]
    fn test_restore_after_rebuild() {
        let c = Node::new("C", "", vec![]);
        let root = Node::new("Root", "", vec![Node::new("B", "", vec![c.clone()])]);
        let first = ExplorerTree::build(&root).unwrap();
        let second = ExplorerTree::build(&root).unwrap();
        assert_eq!(first.restore(&c), second.restore(&c));
        assert_eq!(second.node(second.restore(&c).unwrap()).unwrap().type_name, "C");

        let stranger = Node::new("C", "", vec![]);
        assert_eq!(second.restore(&stranger), None);
    }

    #[test]
    fn test_render() {
        let root = Node::new("Root", "", vec![Node::new("A", "x", vec![])]);
        let tree = ExplorerTree::build(&root).unwrap();
        assert_eq!(tree.render(), "Root\n  A - x\n");
    }

    fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
        // Fan-out of each node in pre-order; nodes past the end are leaves.
        prop::collection::vec(0usize..4, 1..12)
    }

    fn build_shape(shape: &[usize]) -> (DrawableRef, usize) {
        fn make(shape: &[usize], next: &mut usize, count: &mut usize) -> DrawableRef {
            let fanout = shape.get(*next).copied().unwrap_or(0);
            *next += 1;
            *count += 1;
            let children = (0..fanout).map(|_| make(shape, next, count)).collect();
            Node::new("N", "", children)
        }
        let mut next = 0;
        let mut count = 0;
        let root = make(shape, &mut next, &mut count);
        (root, count)
    }

    proptest! {
        #[test]
        fn prop_every_object_gets_one_node(shape in shape_strategy()) {
            let (root, count) = build_shape(&shape);
            let tree = ExplorerTree::build(&root).unwrap();
            prop_assert_eq!(tree.len(), count);
            for node in tree.iter() {
                for child in &node.children {
                    prop_assert_eq!(tree.node(*child).unwrap().parent, node.id);
                    prop_assert!(child.0 > node.id.0);
                }
            }
        }
    }
}
