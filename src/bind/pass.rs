use super::{
    animation::bind_animations,
    diagnostics::{Diagnostic, Diagnostics},
    name_index::NameIndex,
    skinning::{assemble_rig, MeshMap},
    tree::build_tree,
};
use crate::{
    anim::AnimationRoot,
    import::{ImportOptions, ImportScene},
    mesh::Mesh,
    scene::{SceneGraph, TransformNode},
    sl_error::SlError,
};
use log::info;
use std::sync::Arc;

/// Result of one binding pass
#[derive(Debug)]
pub struct Bound {
    pub graph: SceneGraph,
    /// Present if the source had at least one animation or one mesh with
    /// bones
    pub animation_root: Option<AnimationRoot>,
    /// Kept so callers can audit which names were bound. Not needed once
    /// the result has been checked.
    pub names: NameIndex,
    pub diagnostics: Vec<Diagnostic>,
}

impl Bound {
    /// The transform node bound to `name`
    #[must_use]
    pub fn transform_named(&self, name: &str) -> Option<&TransformNode> {
        self.names.get(name).and_then(|id| self.graph.transform(id))
    }
}

/// Runs the whole binding pass: builds the scene graph, binds animation
/// channels and attaches bones to the mesh objects.
///
/// `meshes` must hold the mesh objects for `scene.meshes`, in the same
/// order, built before this is called.
///
/// # Errors
/// May return `SlError` if `scene` fails validation. Everything else is
/// reported through `Bound::diagnostics`.
pub fn bind(
    scene: &ImportScene,
    meshes: &[Arc<Mesh>],
    options: &ImportOptions,
) -> Result<Bound, SlError> {
    scene.validate()?;

    let mut diagnostics = Diagnostics::default();
    let mut graph = SceneGraph::new();
    let into = graph.root();
    let names = build_tree(
        &scene.root,
        &mut graph,
        into,
        meshes,
        options,
        &mut diagnostics,
    );

    let mut animation_root =
        bind_animations(&scene.animations, &names, options, &mut diagnostics);

    let mesh_map = MeshMap::for_bones(&scene.meshes, meshes);
    assemble_rig(
        &scene.meshes,
        &mesh_map,
        &names,
        &mut animation_root,
        &mut diagnostics,
    );

    info!(
        "bound {} nodes, {} names, {} animations, {} animated meshes, {} \
         diagnostics",
        graph.len(),
        names.len(),
        animation_root.as_ref().map_or(0, |r| r.animations.len()),
        animation_root.as_ref().map_or(0, |r| r.meshes.len()),
        diagnostics.as_slice().len(),
    );

    Ok(Bound {
        graph,
        animation_root,
        names,
        diagnostics: diagnostics.into_vec(),
    })
}
