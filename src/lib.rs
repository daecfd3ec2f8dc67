//! Binds imported 3D scene data into a scene graph and a skeletal rig.
//!
//! The import side (`import`) describes a node hierarchy, meshes with bones
//! and named animation channels. The binding pass (`bind::bind`) turns that
//! into a `scene::SceneGraph` of transform, group and mesh nodes, indexes the
//! transform nodes by name, and uses the index to attach animation channels
//! and bones, collecting both in an `anim::AnimationRoot`.
//!
//! ```no_run
//! use sceneloom::{import::ImportOptions, resource::ModelResource};
//! use std::path::Path;
//!
//! let options = ImportOptions::default();
//! let model = ModelResource::load_gltf(Path::new("robot.gltf"), &options)?;
//! for d in model.diagnostics() {
//!     println!("{d}");
//! }
//! # Ok::<(), sceneloom::sl_error::SlError>(())
//! ```
pub mod anim;
pub mod bind;
pub mod import;
pub mod mesh;
pub mod resource;
pub mod scene;
pub mod sl_error;
pub mod types;
