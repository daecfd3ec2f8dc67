use super::{
    diagnostics::{Diagnostic, Diagnostics},
    name_index::NameIndex,
};
use crate::{
    import::{ImportNode, ImportOptions, TransformPolicy},
    mesh::Mesh,
    scene::{NodeId, NodeKind, SceneGraph, TransformNode},
    types::{is_identity, mat4_from_rows},
};
use log::debug;
use nalgebra_glm as glm;
use std::sync::Arc;

/// State for one tree walk. The insertion point is not part of it; that is
/// passed down through `read_node` instead.
struct TreeBuilder<'a> {
    graph: &'a mut SceneGraph,
    meshes: &'a [Arc<Mesh>],
    options: &'a ImportOptions,
    names: NameIndex,
    diagnostics: &'a mut Diagnostics,
}

/// Walks the import hierarchy below `root`, adding nodes under `into`, and
/// returns the name index of every transform node created.
///
/// Mesh attachments refer to `meshes` by index. An attachment with no mesh
/// object is skipped with a diagnostic.
pub fn build_tree(
    root: &ImportNode,
    graph: &mut SceneGraph,
    into: NodeId,
    meshes: &[Arc<Mesh>],
    options: &ImportOptions,
    diagnostics: &mut Diagnostics,
) -> NameIndex {
    let mut builder = TreeBuilder {
        graph,
        meshes,
        options,
        names: NameIndex::new(),
        diagnostics,
    };
    builder.read_node(root, into, &glm::Mat4::identity());
    builder.names
}

impl TreeBuilder<'_> {
    fn wants_transform(&self, node: &ImportNode) -> bool {
        match self.options.transform_policy {
            TransformPolicy::MeshBearing => !node.meshes.is_empty(),
            TransformPolicy::NonIdentity => !is_identity(&node.transform),
        }
    }

    /// `pending` holds the transforms of skipped ancestors when they are
    /// being composed, otherwise it stays identity
    fn read_node(
        &mut self,
        node: &ImportNode,
        parent: NodeId,
        pending: &glm::Mat4,
    ) {
        let mut current = parent;
        let local = mat4_from_rows(&node.transform);
        let mut pending_below = glm::Mat4::identity();

        if self.wants_transform(node) {
            let m = if self.options.compose_skipped_transforms {
                pending * local
            } else {
                local
            };
            let t = TransformNode::from_matrix(&node.name, &m);
            let id = self.graph.add_child(current, NodeKind::Transform(t));
            debug!("node {:?} -> transform {:?}", node.name, id);
            if !self.names.register(&node.name, id) {
                self.diagnostics.record(Diagnostic::DuplicateName {
                    name: node.name.clone(),
                });
            }
            current = id;
        } else if self.options.compose_skipped_transforms {
            pending_below = pending * local;
        }

        if !node.meshes.is_empty() {
            let group = self
                .graph
                .add_child(current, NodeKind::Group(Some(node.name.clone())));
            for &index in &node.meshes {
                if let Some(mesh) = self.meshes.get(index) {
                    self.graph.add_child(
                        group,
                        NodeKind::Mesh {
                            index,
                            mesh: Arc::clone(mesh),
                        },
                    );
                } else {
                    self.diagnostics
                        .record(Diagnostic::MissingMesh { mesh: index });
                }
            }
            current = group;
        }

        for child in &node.children {
            self.read_node(child, current, &pending_below);
        }
    }
}
