use super::types::{rgba, ImportMaterial, ImportMesh, ImportNode, ImportScene};
use crate::sl_error::SlError;
use nalgebra_glm as glm;
use std::path::Path;

#[allow(unused_imports)]
use log::{debug, info, warn};

/// Load a Wavefront OBJ format object from an .obj file. Loads the file into
/// memory and calls `process_obj`. You may call that directly if you've loaded
/// or generated OBJ data some other way.
///
/// # Errors
/// May return `SlError`
pub fn load(path: &Path) -> Result<ImportScene, SlError> {
    let load_result = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS);
    let base_path = path.parent().unwrap_or_else(|| Path::new("."));
    process_obj(base_path, load_result)
}

/// Process loaded Wavefront OBJ format data. OBJ has no hierarchy, bones or
/// animation, so the result is a root node with one child per model, each
/// carrying that model's mesh. Texture paths are relative to `base_path`.
///
/// # Errors
/// May return `SlError`
pub fn process_obj(
    base_path: &Path,
    load_result: tobj::LoadResult,
) -> Result<ImportScene, SlError> {
    let (tobj_models, tobj_materials) = load_result?;
    info!("Found {} models", tobj_models.len());

    let mut root = ImportNode::new("root");
    let mut meshes = Vec::with_capacity(tobj_models.len());
    for (index, m) in tobj_models.iter().enumerate() {
        let mesh = read_mesh(m);
        info!(
            "model {:?} vertices={}, triangles={}, has_normals={}, has_uv={}",
            m.name,
            mesh.vertex_count(),
            mesh.indices.len() / 3,
            !mesh.normals.is_empty(),
            !mesh.tex_coords.is_empty(),
        );
        meshes.push(mesh);
        root.children
            .push(ImportNode::new(&m.name).with_meshes(&[index]));
    }

    // A missing or broken .mtl only loses the materials
    let materials = match tobj_materials {
        Ok(materials) => read_materials(base_path, &materials),
        Err(e) => {
            warn!("OBJ materials not loaded: {e}");
            Vec::new()
        }
    };

    Ok(ImportScene {
        root,
        meshes,
        materials,
        animations: Vec::new(),
    })
}

fn vec3s(flat: &[f32]) -> Vec<glm::Vec3> {
    flat.chunks_exact(3)
        .map(|v| glm::vec3(v[0], v[1], v[2]))
        .collect()
}

fn read_mesh(model: &tobj::Model) -> ImportMesh {
    let mesh = &model.mesh;
    let positions = vec3s(&mesh.positions);

    // Per-vertex data that doesn't match the position count can't be
    // interpreted so it is dropped
    let mut normals = vec3s(&mesh.normals);
    if !normals.is_empty() && normals.len() != positions.len() {
        warn!("model {:?} normal count mismatch, dropped", model.name);
        normals.clear();
    }
    let uv: Vec<[f32; 2]> = mesh
        .texcoords
        .chunks_exact(2)
        .map(|t| [t[0], t[1]])
        .collect();
    let tex_coords = if uv.is_empty() {
        Vec::new()
    } else if uv.len() == positions.len() {
        vec![uv]
    } else {
        warn!("model {:?} texture coordinate count mismatch", model.name);
        Vec::new()
    };
    let mut colours = vec3s(&mesh.vertex_color);
    if !colours.is_empty() && colours.len() != positions.len() {
        warn!("model {:?} vertex colour count mismatch", model.name);
        colours.clear();
    }

    ImportMesh {
        name: model.name.clone(),
        positions,
        normals,
        tex_coords,
        colours,
        indices: mesh.indices.clone(),
        material_id: mesh.material_id.unwrap_or(0),
        bones: Vec::new(),
    }
}

/// MTL has no emission field in `tobj` so the "Ke" statement is read from
/// the unknown parameters
fn read_materials(
    base_path: &Path,
    tobj_materials: &[tobj::Material],
) -> Vec<ImportMaterial> {
    let mut materials = Vec::new();
    for m in tobj_materials {
        let colour_filename = {
            if m.diffuse_texture.is_empty() {
                String::new()
            } else {
                base_path.join(&m.diffuse_texture).display().to_string()
            }
        };
        info!(
            "Processing material {:?} with texture \"{}\"",
            m.name, colour_filename
        );
        let emission = m.unknown_param.get("Ke").and_then(|x| {
            let c: Vec<f32> = x
                .split_whitespace()
                .filter_map(|v| v.parse::<f32>().ok())
                .collect();
            (c.len() == 3).then(|| rgba([c[0], c[1], c[2]]))
        });
        let mut material = ImportMaterial {
            name: m.name.clone(),
            colour_filename,
            diffuse: rgba(m.diffuse),
            specular: rgba(m.specular),
            ambient: rgba(m.ambient),
            ..Default::default()
        };
        if let Some(emission) = emission {
            material.emission = emission;
        }
        material.set_shininess(m.shininess);
        materials.push(material);
    }
    materials
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    const TWO_QUADS: &str = "\
mtllib quads.mtl
o Floor
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl stone
f 1/1 2/2 3/3 4/4
o Wall
v 0 0 0
v 1 0 0
v 1 1 0
usemtl brick
f 5 6 7
";

    const QUAD_MATERIALS: &str = "\
newmtl stone
Kd 0.5 0.5 0.5
Ks 0.1 0.2 0.3
Ka 0.05 0.05 0.05
Ke 1 0.5 0
Ns 32
map_Kd stone.png
newmtl brick
Kd 0.8 0.2 0.1
Ns 900
";

    fn load_quads(with_materials: bool) -> ImportScene {
        let mut reader = BufReader::new(TWO_QUADS.as_bytes());
        let load_result =
            tobj::load_obj_buf(&mut reader, &tobj::GPU_LOAD_OPTIONS, |_| {
                if with_materials {
                    tobj::load_mtl_buf(&mut BufReader::new(
                        QUAD_MATERIALS.as_bytes(),
                    ))
                } else {
                    Err(tobj::LoadError::OpenFileFailed)
                }
            });
        process_obj(Path::new("assets"), load_result).unwrap()
    }

    #[test]
    fn one_node_per_model() {
        let scene = load_quads(false);
        assert_eq!(scene.meshes.len(), 2);
        assert_eq!(scene.meshes[0].name, "Floor");
        assert_eq!(scene.meshes[0].vertex_count(), 4);
        assert_eq!(scene.meshes[1].vertex_count(), 3);
        assert_eq!(scene.root.children.len(), 2);
        assert_eq!(scene.root.children[1].name, "Wall");
        assert_eq!(scene.root.children[1].meshes.as_slice(), &[1]);
        assert!(scene.animations.is_empty());
        assert!(scene.materials.is_empty());
        assert!(!scene.has_bones());
    }

    #[test]
    fn geometry_is_read() {
        let scene = load_quads(false);
        let floor = &scene.meshes[0];
        assert_eq!(floor.positions[2], glm::vec3(1.0, 0.0, 1.0));
        // The quad is triangulated
        assert_eq!(floor.indices.len(), 6);
        assert!(floor.indices.iter().all(|&i| i < 4));
        assert_eq!(floor.tex_coords.len(), 1);
        assert_eq!(floor.tex_coords[0][2], [1.0, 1.0]);
        assert!(floor.normals.is_empty());

        let wall = &scene.meshes[1];
        assert_eq!(wall.indices, vec![0, 1, 2]);
        assert_eq!(wall.positions[2], glm::vec3(1.0, 1.0, 0.0));
        assert!(wall.tex_coords.is_empty());
    }

    #[test]
    fn materials_are_read() {
        let scene = load_quads(true);
        assert_eq!(scene.materials.len(), 2);
        assert_eq!(scene.meshes[0].material_id, 0);
        assert_eq!(scene.meshes[1].material_id, 1);

        let stone = &scene.materials[0];
        assert_eq!(stone.name, "stone");
        assert_eq!(stone.diffuse, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(stone.specular, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(stone.ambient, [0.05, 0.05, 0.05, 1.0]);
        assert_eq!(stone.emission, [1.0, 0.5, 0.0, 1.0]);
        assert!((stone.shininess - 32.0).abs() < f32::EPSILON);
        assert_eq!(
            Path::new(&stone.colour_filename),
            Path::new("assets").join("stone.png")
        );

        // Shininess out of range keeps the default
        let brick = &scene.materials[1];
        assert_eq!(brick.shininess, 0.0);
        assert!(brick.colour_filename.is_empty());
        assert_eq!(brick.emission, [0.0, 0.0, 0.0, 1.0]);
    }
}
