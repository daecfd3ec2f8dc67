pub mod gltf_file;
pub mod obj_file;
mod types;
mod validate;

// Re-exports
pub use types::{
    rgba, ImportAnimation, ImportBone, ImportChannel, ImportError,
    ImportMaterial, ImportMesh, ImportNode, ImportOptions, ImportScene,
    PositionKey, RotationKey, TransformPolicy, VertexWeight, MAX_SHININESS,
};
