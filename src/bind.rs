pub mod animation;
mod diagnostics;
mod name_index;
mod pass;
pub mod skinning;
pub mod tree;

// Re-exports
pub use {
    animation::bind_animations,
    diagnostics::{Diagnostic, Diagnostics},
    name_index::NameIndex,
    pass::{bind, Bound},
    skinning::{assemble_rig, MeshMap},
    tree::build_tree,
};
