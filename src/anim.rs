mod types;

// Re-exports
pub use types::{
    AnimatedMesh, AnimatedTransformation, Animation, AnimationRoot, Bone,
    PositionKey, RotationKey,
};
