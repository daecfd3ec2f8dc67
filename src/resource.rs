use crate::{
    anim::AnimationRoot,
    bind::{self, Diagnostic},
    import::{gltf_file, obj_file, ImportOptions, ImportScene},
    mesh::{self, Material, Mesh},
    scene::SceneGraph,
    sl_error::SlError,
};
use log::info;
use std::{path::Path, sync::Arc};

/// A loaded model: the scene graph, its animation data if any, and the mesh
/// and material objects both refer to. Everything is fixed once constructed.
#[derive(Debug)]
pub struct ModelResource {
    graph: SceneGraph,
    animation_root: Option<AnimationRoot>,
    meshes: Vec<Arc<Mesh>>,
    materials: Vec<Arc<Material>>,
    diagnostics: Vec<Diagnostic>,
}

impl ModelResource {
    /// Builds material and mesh objects for `scene` and binds it. The name index used
    /// during binding is dropped.
    ///
    /// # Errors
    /// May return `SlError`
    pub fn from_import(
        scene: &ImportScene,
        options: &ImportOptions,
    ) -> Result<Self, SlError> {
        let materials = mesh::build_materials(&scene.materials);
        let meshes = mesh::build_meshes(&scene.meshes, &materials);
        let bound = bind::bind(scene, &meshes, options)?;
        Ok(Self {
            graph: bound.graph,
            animation_root: bound.animation_root,
            meshes,
            materials,
            diagnostics: bound.diagnostics,
        })
    }

    /// Loads and binds a glTF file
    ///
    /// # Errors
    /// May return `SlError`
    pub fn load_gltf(
        path: &Path,
        options: &ImportOptions,
    ) -> Result<Self, SlError> {
        info!("loading glTF {:?}", path);
        let scene = gltf_file::load(path)?;
        Self::from_import(&scene, options)
    }

    /// Loads and binds a Wavefront OBJ file
    ///
    /// # Errors
    /// May return `SlError`
    pub fn load_obj(
        path: &Path,
        options: &ImportOptions,
    ) -> Result<Self, SlError> {
        info!("loading OBJ {:?}", path);
        let scene = obj_file::load(path)?;
        Self::from_import(&scene, options)
    }

    #[must_use]
    pub const fn scene_node(&self) -> &SceneGraph {
        &self.graph
    }

    #[must_use]
    pub const fn animations(&self) -> Option<&AnimationRoot> {
        self.animation_root.as_ref()
    }

    #[must_use]
    pub fn meshes(&self) -> &[Arc<Mesh>] {
        &self.meshes
    }

    #[must_use]
    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }

    /// Everything skipped while binding
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
