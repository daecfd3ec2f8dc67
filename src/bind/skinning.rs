use super::{
    diagnostics::{Diagnostic, Diagnostics},
    name_index::NameIndex,
};
use crate::{
    anim::{AnimatedMesh, AnimationRoot, Bone},
    import::{ImportBone, ImportMesh},
    mesh::Mesh,
    scene::NodeId,
    types::mat4_from_rows,
};
use ahash::{HashMap, HashMapExt};
use log::{debug, info};
use std::sync::Arc;

/// Import mesh index to mesh object, for the meshes that carry bones
#[derive(Debug, Default)]
pub struct MeshMap(HashMap<usize, Arc<Mesh>>);

impl MeshMap {
    /// Collects the mesh objects of every bone-bearing import mesh. `meshes`
    /// must be indexed the same way as `imports`. Indices with no mesh
    /// object are left out and show up later as `MissingMesh`.
    #[must_use]
    pub fn for_bones(imports: &[ImportMesh], meshes: &[Arc<Mesh>]) -> Self {
        let mut map = HashMap::new();
        for (index, import) in imports.iter().enumerate() {
            if import.bones.is_empty() {
                continue;
            }
            if let Some(mesh) = meshes.get(index) {
                map.insert(index, Arc::clone(mesh));
            }
        }
        Self(map)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<Mesh>> {
        self.0.get(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Attaches bones to every import mesh that declares them and adds the
/// resulting animated meshes to `root`, creating the root if needed.
///
/// A mesh with no mesh object is skipped. A bone naming a node that has no
/// transform node is skipped, leaving the mesh under-rigged. Weights are
/// copied as given.
pub fn assemble_rig(
    imports: &[ImportMesh],
    mesh_map: &MeshMap,
    names: &NameIndex,
    root: &mut Option<AnimationRoot>,
    diagnostics: &mut Diagnostics,
) {
    if !imports.iter().any(|m| !m.bones.is_empty()) {
        return;
    }
    let root = root.get_or_insert_with(AnimationRoot::default);

    for (index, import) in imports.iter().enumerate() {
        if import.bones.is_empty() {
            continue;
        }
        let Some(mesh) = mesh_map.get(index) else {
            diagnostics.record(Diagnostic::MissingMesh { mesh: index });
            continue;
        };
        let mut animated = AnimatedMesh {
            index,
            mesh: Arc::clone(mesh),
            bones: Vec::with_capacity(import.bones.len()),
        };
        for bone in &import.bones {
            let Some(joint) = names.get(&bone.name) else {
                diagnostics.record(Diagnostic::UnknownBone {
                    mesh: index,
                    bone: bone.name.clone(),
                });
                continue;
            };
            animated.bones.push(make_bone(bone, joint));
        }
        info!(
            "mesh {} {:?}: {} of {} bones bound",
            index,
            import.name,
            animated.bones.len(),
            import.bones.len(),
        );
        root.meshes.push(animated);
    }
}

fn make_bone(bone: &ImportBone, joint: NodeId) -> Bone {
    debug!("bone {:?}: weights={}", bone.name, bone.weights.len());
    Bone {
        name: bone.name.clone(),
        joint,
        weights: bone.weights.clone(),
        offset: mat4_from_rows(&bone.offset),
    }
}
