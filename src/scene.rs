mod graph;
pub mod transform;

// Re-exports
pub use {
    graph::{NodeId, NodeKind, SceneGraph, SceneNode},
    transform::TransformNode,
};
