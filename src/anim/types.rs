use crate::{import::VertexWeight, mesh::Mesh, scene::NodeId};
use nalgebra_glm as glm;
use std::sync::Arc;

/// Rotation keyframe. `time` is in microseconds.
#[derive(Clone, Copy, Debug)]
pub struct RotationKey {
    pub time: f64,
    pub value: glm::Quat,
}

/// Position keyframe. `time` is in microseconds.
#[derive(Clone, Copy, Debug)]
pub struct PositionKey {
    pub time: f64,
    pub value: glm::Vec3,
}

/// The rotation and position tracks for one transform node
#[derive(Clone, Debug)]
pub struct AnimatedTransformation {
    pub target: NodeId,
    pub name: String,
    pub rotations: Vec<RotationKey>,
    pub positions: Vec<PositionKey>,
}

#[derive(Clone, Debug)]
pub struct Animation {
    pub name: String,
    /// Microseconds
    pub duration: f64,
    pub ticks_per_second: f64,
    /// In source channel order
    pub transformations: Vec<AnimatedTransformation>,
}

/// A joint's influence on the vertices of one mesh
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub joint: NodeId,
    pub weights: Vec<VertexWeight>,
    /// Mesh space to bone space in the bind pose, `offset[(r, c)]` is row
    /// `r` column `c` of the source matrix
    pub offset: glm::Mat4,
}

/// A previously built mesh together with its bones
#[derive(Clone, Debug)]
pub struct AnimatedMesh {
    /// Index in the import mesh list
    pub index: usize,
    pub mesh: Arc<Mesh>,
    /// In source bone order
    pub bones: Vec<Bone>,
}

/// Everything animated in one asset
#[derive(Clone, Debug, Default)]
pub struct AnimationRoot {
    pub animations: Vec<Animation>,
    pub meshes: Vec<AnimatedMesh>,
}

impl AnimationRoot {
    #[must_use]
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name == name)
    }

    /// Animated mesh for an import mesh index
    #[must_use]
    pub fn mesh(&self, index: usize) -> Option<&AnimatedMesh> {
        self.meshes.iter().find(|m| m.index == index)
    }
}
