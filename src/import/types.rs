use crate::{
    sl_error::SlError,
    types::{RowMatrix, IDENTITY_ROWS},
};
use log::debug;
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::Path;

/// One node of the import hierarchy. Mesh attachments are indices into
/// `ImportScene::meshes`.
#[derive(Clone, Debug)]
pub struct ImportNode {
    pub name: String,
    pub transform: RowMatrix,
    pub meshes: SmallVec<[usize; 4]>,
    pub children: Vec<ImportNode>,
}

impl ImportNode {
    /// Node with an identity transform, no meshes and no children
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: IDENTITY_ROWS,
            meshes: SmallVec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: RowMatrix) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_meshes(mut self, meshes: &[usize]) -> Self {
        self.meshes.extend_from_slice(meshes);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including this one
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// A (vertex index, weight) pair. Stored exactly as given; weights for a
/// vertex are not expected to sum to 1.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

#[derive(Clone, Debug)]
pub struct ImportBone {
    pub name: String,
    /// Mesh space to bone space in the bind pose, row-major
    pub offset: RowMatrix,
    pub weights: Vec<VertexWeight>,
}

/// Geometry of one triangle mesh. Per-vertex lists other than `positions`
/// are either empty or as long as `positions`.
#[derive(Clone, Debug, Default)]
pub struct ImportMesh {
    pub name: String,
    pub positions: Vec<glm::Vec3>,
    pub normals: Vec<glm::Vec3>,
    /// One list per UV set
    pub tex_coords: Vec<Vec<[f32; 2]>>,
    /// Vertex colour set 0, RGB only
    pub colours: Vec<glm::Vec3>,
    /// Triangle list, three indices per face
    pub indices: Vec<u32>,
    /// Index into `ImportScene::materials`
    pub material_id: usize,
    pub bones: Vec<ImportBone>,
}

impl ImportMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Upper limit for an accepted specular exponent
pub const MAX_SHININESS: f32 = 128.0;

/// Holds an imported material. Textures are not loaded, only the path to the
/// diffuse texture is kept.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportMaterial {
    pub name: String,
    pub colour_filename: String, // Diffuse texture, empty if none
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub ambient: [f32; 4],
    pub emission: [f32; 4],
    pub shininess: f32,
}

impl Default for ImportMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            colour_filename: String::new(),
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            ambient: [0.0, 0.0, 0.0, 1.0],
            emission: [0.0, 0.0, 0.0, 1.0],
            shininess: 0.0,
        }
    }
}

impl ImportMaterial {
    /// Sets the specular exponent if it is within `0..=MAX_SHININESS`,
    /// otherwise leaves it unchanged
    pub fn set_shininess(&mut self, value: f32) {
        if (0.0..=MAX_SHININESS).contains(&value) {
            self.shininess = value;
        } else {
            debug!("material {:?} shininess {} ignored", self.name, value);
        }
    }
}

/// Opaque RGBA from an RGB colour
#[must_use]
pub const fn rgba(c: [f32; 3]) -> [f32; 4] {
    [c[0], c[1], c[2], 1.0]
}

/// Rotation key with the time in seconds of source time
#[derive(Clone, Copy, Debug)]
pub struct RotationKey {
    pub time: f64,
    pub value: glm::Quat,
}

/// Position key with the time in seconds of source time
#[derive(Clone, Copy, Debug)]
pub struct PositionKey {
    pub time: f64,
    pub value: glm::Vec3,
}

/// Keys for one target node. Keys must already be in time order.
#[derive(Clone, Debug, Default)]
pub struct ImportChannel {
    pub node_name: String,
    pub rotation_keys: Vec<RotationKey>,
    pub position_keys: Vec<PositionKey>,
}

#[derive(Clone, Debug, Default)]
pub struct ImportAnimation {
    pub name: String,
    /// Seconds of source time
    pub duration: f64,
    /// Copied through untouched. Zero means the source did not declare one.
    pub ticks_per_second: f64,
    pub channels: Vec<ImportChannel>,
}

/// Everything the import collaborator hands over for one asset
#[derive(Clone, Debug)]
pub struct ImportScene {
    pub root: ImportNode,
    pub meshes: Vec<ImportMesh>,
    pub materials: Vec<ImportMaterial>,
    pub animations: Vec<ImportAnimation>,
}

impl ImportScene {
    #[must_use]
    pub const fn new(root: ImportNode) -> Self {
        Self {
            root,
            meshes: Vec::new(),
            materials: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// True if any mesh declares bones
    #[must_use]
    pub fn has_bones(&self) -> bool {
        self.meshes.iter().any(|m| !m.bones.is_empty())
    }
}

/// When the tree builder creates a transform node for an import node
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum TransformPolicy {
    /// For every node that has at least one mesh attached
    #[default]
    MeshBearing,
    /// For every node whose transform is not exactly the identity
    NonIdentity,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(default)]
pub struct ImportOptions {
    /// Multiplier from source key times to seconds
    pub time_scale: f64,
    pub transform_policy: TransformPolicy,
    /// Fold the transforms of nodes that produce no transform node into the
    /// next transform node below them instead of dropping them
    pub compose_skipped_transforms: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            time_scale: 1.0f64,
            transform_policy: TransformPolicy::MeshBearing,
            compose_skipped_transforms: false,
        }
    }
}

impl ImportOptions {
    /// Reads options from YAML text. Missing fields take their defaults.
    ///
    /// # Errors
    /// May return `SlError`
    pub fn from_yaml_str(text: &str) -> Result<Self, SlError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads options from a YAML file
    ///
    /// # Errors
    /// May return `SlError`
    pub fn from_yaml_file(path: &Path) -> Result<Self, SlError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

/// Errors specific to importing data. `SlError` has a `From` trait to
/// handle these.
#[derive(Debug)]
pub enum ImportError {
    NoScene,
    NoInverseBind(usize),
    NoSampler,
    Morphing,
    NoTriangles(String),
    MeshIndexOutOfRange { node: String, index: usize },
    UnsortedKeys { animation: String, channel: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NoScene => write!(f, "the file contains no scene"),
            Self::NoInverseBind(a) => {
                write!(f, "skin {a} has no inverse bind matrices")
            }
            Self::NoSampler => {
                write!(f, "a sampler is required for animation")
            }
            Self::Morphing => {
                write!(f, "morphing animation is not supported")
            }
            Self::NoTriangles(a) => {
                write!(f, "mesh {a:?} is not made of triangles")
            }
            Self::MeshIndexOutOfRange { node, index } => {
                write!(f, "node {node:?} attaches missing mesh {index}")
            }
            Self::UnsortedKeys { animation, channel } => {
                write!(
                    f,
                    "animation {animation:?} channel {channel:?} has keys \
                     out of time order"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_from_empty_yaml() {
        let options = ImportOptions::from_yaml_str("{}").unwrap();
        assert_eq!(options, ImportOptions::default());
    }

    #[test]
    fn options_from_yaml() {
        let text = "time_scale: 0.04\n\
                    transform_policy: NonIdentity\n\
                    compose_skipped_transforms: true\n";
        let options = ImportOptions::from_yaml_str(text).unwrap();
        assert!((options.time_scale - 0.04).abs() < f64::EPSILON);
        assert_eq!(options.transform_policy, TransformPolicy::NonIdentity);
        assert!(options.compose_skipped_transforms);
    }

    #[test]
    fn options_reject_bad_yaml() {
        let result = ImportOptions::from_yaml_str("time_scale: [1, 2]");
        assert!(matches!(result, Err(SlError::SerdeYamlError(_))));
    }

    #[test]
    fn shininess_outside_range_is_ignored() {
        let mut material = ImportMaterial::default();
        material.set_shininess(64.0);
        assert!((material.shininess - 64.0).abs() < f32::EPSILON);
        material.set_shininess(500.0);
        assert!((material.shininess - 64.0).abs() < f32::EPSILON);
        material.set_shininess(-1.0);
        assert!((material.shininess - 64.0).abs() < f32::EPSILON);
        material.set_shininess(MAX_SHININESS);
        assert!((material.shininess - MAX_SHININESS).abs() < f32::EPSILON);
    }

    #[test]
    fn node_count_includes_subtree() {
        let root = ImportNode::new("root")
            .with_child(ImportNode::new("a").with_child(ImportNode::new("b")))
            .with_child(ImportNode::new("c"));
        assert_eq!(root.count(), 4);
    }
}
