use super::transform::TransformNode;
use crate::mesh::Mesh;
use nalgebra_glm as glm;
use std::sync::Arc;

/// Handle to a node in a `SceneGraph`. Only meaningful for the graph that
/// created it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Plain container with an optional label for diagnostics
    Group(Option<String>),
    Transform(TransformNode),
    /// Reference to an already built mesh, with its import mesh index
    Mesh { index: usize, mesh: Arc<Mesh> },
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub const fn transform(&self) -> Option<&TransformNode> {
        match &self.kind {
            NodeKind::Transform(t) => Some(t),
            _ => None,
        }
    }
}

/// Tree of scene nodes. The graph owns all nodes; a node only refers to its
/// children and parent by `NodeId`. Nodes are never removed so ids stay
/// valid for the life of the graph.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph holding only an unlabelled root group
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode {
                kind: NodeKind::Group(None),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes including the root
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A graph always has its root so is never empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Appends a new node as the last child of `parent`
    ///
    /// # Panics
    /// Will panic if `parent` does not belong to this graph
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn transform(&self, id: NodeId) -> Option<&TransformNode> {
        self.get(id).and_then(SceneNode::transform)
    }

    /// All nodes with their ids, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// All transform nodes with their ids, in creation order
    pub fn transforms(
        &self,
    ) -> impl Iterator<Item = (NodeId, &TransformNode)> {
        self.iter().filter_map(|(id, n)| n.transform().map(|t| (id, t)))
    }

    /// Ids of the subtree below `id` in depth first pre-order, starting with
    /// `id` itself
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Product of every transform node's local matrix from the root down to
    /// and including `id`. Other node kinds don't contribute.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> glm::Mat4 {
        let mut m = glm::Mat4::identity();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            if let Some(t) = node.transform() {
                m = t.local_matrix() * m;
            }
            current = node.parent;
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(name: &str, x: f32) -> NodeKind {
        let m = glm::translation(&glm::vec3(x, 0.0, 0.0));
        NodeKind::Transform(TransformNode::from_matrix(name, &m))
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, NodeKind::Group(Some("a".into())));
        let b = graph.add_child(root, NodeKind::Group(Some("b".into())));
        let c = graph.add_child(a, NodeKind::Group(None));
        assert_eq!(graph.get(root).unwrap().children(), &[a, b]);
        assert_eq!(graph.get(c).unwrap().parent(), Some(a));
        assert_eq!(graph.descendants(root), vec![root, a, c, b]);
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn world_matrix_accumulates_transforms() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let outer = graph.add_child(root, transform("outer", 1.0));
        let group = graph.add_child(outer, NodeKind::Group(None));
        let inner = graph.add_child(group, transform("inner", 2.0));
        let m = graph.world_matrix(inner);
        assert!((m[(0, 3)] - 3.0).abs() < 0.0001);
        assert_eq!(graph.transforms().count(), 2);
    }
}
