// Some code inspired by
// https://github.com/KhronosGroup/glTF-Tutorials/

use super::types::{
    rgba, ImportAnimation, ImportBone, ImportChannel, ImportError,
    ImportMaterial, ImportMesh, ImportNode, ImportScene, PositionKey,
    RotationKey, VertexWeight,
};
use crate::{
    sl_error::SlError,
    types::{rows_from_columns, RowMatrix},
};
use ahash::{HashMap, HashMapExt};
use gltf::{
    animation::{util::ReadOutputs, Interpolation},
    buffer::{self, Data},
    image::Source,
    mesh::Mode,
    Document, Gltf, Node, Primitive,
};
use log::{debug, error, info, trace, warn};
use nalgebra_glm as glm;
use std::{fs, io, ops::Range, path::Path};

fn load_impl<P>(path: P) -> Result<(Document, Vec<buffer::Data>), SlError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let base = path.parent().unwrap_or_else(|| Path::new("./"));
    let file = fs::File::open(path).map_err(SlError::StdIoError)?;
    let reader = io::BufReader::new(file);
    let gltf = Gltf::from_reader(reader)?;
    let buffers = gltf::import_buffers(&gltf.document, Some(base), gltf.blob)?;

    // Some info
    info!(
        "{:?}, base path={:?}, buffer count={}, first buffer length={} ",
        path,
        base,
        buffers.len(),
        buffers.first().map_or(0, |b| b.len()),
    );

    Ok((gltf.document, buffers))
}

/// Load a glTF file into an `ImportScene`: node hierarchy, triangle
/// geometry, materials, skins and rotation/translation animation. Texture
/// images are not loaded.
///
/// # Errors
/// May return `SlError`
pub fn load(path: &Path) -> Result<ImportScene, SlError> {
    let (document, buffers) = load_impl(path)?;
    let base_path = path.parent().unwrap_or_else(|| Path::new("."));
    from_document(&document, &buffers, base_path)
}

/// Converts an already loaded glTF document. The default scene is used, or
/// the first scene if there is no default. Its root nodes become children of
/// a synthetic identity root named after the scene.
///
/// Each primitive becomes one `ImportMesh`, so a node's mesh attachments
/// are the primitives of its glTF mesh. Skins are turned into per-mesh
/// bones the way the binder expects them: bone name is the joint node name
/// and the offset is the inverse bind matrix. Texture paths are relative to
/// `base_path`.
///
/// # Errors
/// May return `SlError`
pub fn from_document(
    document: &Document,
    buffers: &[Data],
    base_path: &Path,
) -> Result<ImportScene, SlError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ImportError::NoScene)?;
    let scene_count = document.scenes().count();
    if scene_count > 1 {
        warn!(
            "{} scenes present, only scene {} is imported",
            scene_count,
            scene.index()
        );
    }

    let mut materials = read_materials(base_path, document);
    let default_material = materials.len();
    let (mut meshes, ranges) =
        read_meshes(document, buffers, default_material)?;
    if meshes.iter().any(|m| m.material_id == default_material) {
        materials.push(ImportMaterial {
            name: "default".to_string(),
            ..Default::default()
        });
    }
    read_skins(document, buffers, &ranges, &mut meshes)?;

    let name = scene.name().map_or_else(
        || format!("scene.{}", scene.index()),
        ToString::to_string,
    );
    let mut root = ImportNode::new(&name);
    for node in scene.nodes() {
        root.children.push(read_node(&node, &ranges));
    }

    let animations = read_animations(document, buffers)?;
    Ok(ImportScene {
        root,
        meshes,
        materials,
        animations,
    })
}

fn node_name(node: &Node) -> String {
    node.name()
        .map_or_else(|| format!("node.{}", node.index()), ToString::to_string)
}

/// Recursive node tree traversal
fn read_node(node: &Node, ranges: &[Range<usize>]) -> ImportNode {
    let meshes = node
        .mesh()
        .and_then(|m| ranges.get(m.index()).cloned())
        .unwrap_or_default()
        .collect();
    ImportNode {
        name: node_name(node),
        transform: rows_from_columns(&node.transform().matrix()),
        meshes,
        children: node
            .children()
            .map(|child| read_node(&child, ranges))
            .collect(),
    }
}

/// Returns one `ImportMesh` per primitive, plus the range of import mesh
/// indices belonging to each glTF mesh. Primitives without a material get
/// `default_material`.
fn read_meshes(
    document: &Document,
    buffers: &[Data],
    default_material: usize,
) -> Result<(Vec<ImportMesh>, Vec<Range<usize>>), SlError> {
    let mut meshes = Vec::new();
    let mut ranges = Vec::new();
    for m in document.meshes() {
        let start = meshes.len();
        let mesh_name = m.name().map_or_else(
            || format!("mesh.{}", m.index()),
            ToString::to_string,
        );
        let primitive_count = m.primitives().count();
        for p in m.primitives() {
            let name = if primitive_count > 1 {
                format!("{}.{}", mesh_name, p.index())
            } else {
                mesh_name.clone()
            };
            let mut mesh = read_primitive(&p, buffers, name)?;
            mesh.material_id = p.material().index().unwrap_or(default_material);
            info!(
                "mesh={}, primitive={}, vertex count={}, triangles={}",
                m.index(),
                p.index(),
                mesh.vertex_count(),
                mesh.indices.len() / 3,
            );
            meshes.push(mesh);
        }
        ranges.push(start..meshes.len());
    }
    Ok((meshes, ranges))
}

fn read_primitive(
    p: &Primitive,
    buffers: &[Data],
    name: String,
) -> Result<ImportMesh, SlError> {
    if p.mode() != Mode::Triangles {
        error!("Not a triangle mesh");
        return Err(ImportError::NoTriangles(name).into());
    }
    let reader = p.reader(|x| Some(&buffers[x.index()]));

    let positions: Vec<glm::Vec3> = reader
        .read_positions()
        .map(|it| it.map(|v| glm::vec3(v[0], v[1], v[2])).collect())
        .unwrap_or_default();
    let normals = reader
        .read_normals()
        .map(|it| it.map(|v| glm::vec3(v[0], v[1], v[2])).collect())
        .unwrap_or_default();
    let mut tex_coords = Vec::new();
    for set in 0.. {
        let Some(uv) = reader.read_tex_coords(set) else {
            break;
        };
        tex_coords.push(uv.into_f32().collect::<Vec<_>>());
    }
    let colours = reader
        .read_colors(0)
        .map(|it| {
            it.into_rgb_f32()
                .map(|c| glm::vec3(c[0], c[1], c[2]))
                .collect()
        })
        .unwrap_or_default();

    // Non-indexed primitives use every vertex in order
    let indices = if let Some(it) = reader.read_indices() {
        it.into_u32().collect()
    } else {
        let count = u32::try_from(positions.len())
            .map_err(|_| SlError::IndexTooLarge)?;
        (0..count).collect()
    };

    Ok(ImportMesh {
        name,
        positions,
        normals,
        tex_coords,
        colours,
        indices,
        material_id: 0,
        bones: Vec::new(),
    })
}

/// glTF materials are metallic-roughness so only base colour, emission and
/// the base colour texture carry over. Textures embedded in a buffer have no
/// path and are skipped.
fn read_materials(
    base_path: &Path,
    document: &Document,
) -> Vec<ImportMaterial> {
    info!("Materials={}", document.materials().count());
    let mut materials = Vec::new();
    for m in document.materials() {
        let pbr = m.pbr_metallic_roughness();
        let colour_filename = {
            pbr.base_color_texture().map_or_else(String::new, |tex| {
                let source = tex.texture().source().source();
                if let Source::Uri { uri, mime_type: _ } = source {
                    let ret = base_path.join(uri);
                    ret.display().to_string()
                } else {
                    debug!("Embedded texture ignored");
                    String::new()
                }
            })
        };
        let material = ImportMaterial {
            name: m.name().map_or_else(
                || format!("material.{}", m.index().unwrap_or(0)),
                ToString::to_string,
            ),
            colour_filename,
            diffuse: pbr.base_color_factor(),
            emission: rgba(m.emissive_factor()),
            ..Default::default()
        };
        info!(
            "Material {} name={} texture={} diffuse={:?} emission={:?}",
            m.index().unwrap_or(0),
            material.name,
            material.colour_filename,
            material.diffuse,
            material.emission,
        );
        materials.push(material);
    }
    materials
}

fn read_skins(
    document: &Document,
    buffers: &[Data],
    ranges: &[Range<usize>],
    meshes: &mut [ImportMesh],
) -> Result<(), SlError> {
    for node in document.nodes() {
        let (Some(skin), Some(mesh)) = (node.skin(), node.mesh()) else {
            continue;
        };
        let reader = skin.reader(|x| Some(&buffers[x.index()]));
        let Some(iter) = reader.read_inverse_bind_matrices() else {
            error!("Missing inverse bind matrices");
            return Err(ImportError::NoInverseBind(skin.index()).into());
        };
        let joints: Vec<(String, RowMatrix)> = skin
            .joints()
            .zip(iter)
            .map(|(joint, ibm)| (node_name(&joint), rows_from_columns(&ibm)))
            .collect();
        debug!("skin {} joints={}", skin.index(), joints.len());

        let Some(range) = ranges.get(mesh.index()) else {
            continue;
        };
        for p in mesh.primitives() {
            let Some(target) = meshes.get_mut(range.start + p.index()) else {
                continue;
            };
            if !target.bones.is_empty() {
                warn!(
                    "mesh {:?} is skinned by more than one node, keeping the \
                     first skin",
                    target.name
                );
                continue;
            }
            let mut bones: Vec<ImportBone> = joints
                .iter()
                .map(|(name, offset)| ImportBone {
                    name: name.clone(),
                    offset: *offset,
                    weights: Vec::new(),
                })
                .collect();

            let reader = p.reader(|x| Some(&buffers[x.index()]));
            if let (Some(joint_data), Some(weight_data)) =
                (reader.read_joints(0), reader.read_weights(0))
            {
                for (vertex, (ids, weights)) in joint_data
                    .into_u16()
                    .zip(weight_data.into_f32())
                    .enumerate()
                {
                    trace!("Joint ids={:?} weights={:?}", ids, weights);
                    let vertex = u32::try_from(vertex)
                        .map_err(|_| SlError::IndexTooLarge)?;
                    for (id, weight) in ids.iter().zip(weights) {
                        if weight <= 0.0 {
                            continue;
                        }
                        if let Some(bone) = bones.get_mut(usize::from(*id)) {
                            bone.weights.push(VertexWeight { vertex, weight });
                        } else {
                            warn!(
                                "vertex {} uses joint {} but skin {} has {}",
                                vertex,
                                id,
                                skin.index(),
                                joints.len()
                            );
                        }
                    }
                }
            } else {
                warn!(
                    "primitive {} of skinned mesh {:?} has no joint data",
                    p.index(),
                    target.name
                );
            }
            target.bones = bones;
        }
    }
    Ok(())
}

/// Cubic spline outputs hold an in-tangent, value and out-tangent per key.
/// Only the values are kept.
fn key_values<T>(values: Vec<T>, interpolation: Interpolation) -> Vec<T> {
    if interpolation == Interpolation::CubicSpline {
        values.into_iter().skip(1).step_by(3).collect()
    } else {
        values
    }
}

/// Rotation and translation channels for the same node share one
/// `ImportChannel`, in order of the node's first channel
fn channel_slot<'c>(
    channels: &'c mut Vec<ImportChannel>,
    by_node: &mut HashMap<usize, usize>,
    node: &Node,
) -> &'c mut ImportChannel {
    let slot = *by_node.entry(node.index()).or_insert_with(|| {
        channels.push(ImportChannel {
            node_name: node_name(node),
            ..Default::default()
        });
        channels.len() - 1
    });
    &mut channels[slot]
}

fn read_animations(
    document: &Document,
    buffers: &[Data],
) -> Result<Vec<ImportAnimation>, SlError> {
    let mut ret = Vec::new();
    for animation in document.animations() {
        debug!("animation name={:?}", animation.name());
        let mut channels = Vec::new();
        let mut by_node = HashMap::<usize, usize>::new();
        let mut duration = 0.0_f64;

        for channel in animation.channels() {
            let node = channel.target().node();
            let interpolation = channel.sampler().interpolation();
            let reader = channel.reader(|x| Some(&buffers[x.index()]));
            let Some(inputs) = reader.read_inputs() else {
                error!("Animation does not contain a sampler");
                return Err(ImportError::NoSampler.into());
            };
            let times: Vec<f64> = inputs.map(f64::from).collect();
            if let Some(last) = times.last() {
                duration = duration.max(*last);
            }
            let Some(outputs) = reader.read_outputs() else {
                error!("Animation does not contain a sampler output");
                return Err(ImportError::NoSampler.into());
            };

            match outputs {
                ReadOutputs::Rotations(x) => {
                    let values = key_values(
                        x.into_f32().collect::<Vec<_>>(),
                        interpolation,
                    );
                    let keys = times.iter().zip(values).map(|(&time, q)| {
                        RotationKey {
                            time,
                            value: glm::quat(q[0], q[1], q[2], q[3]),
                        }
                    });
                    channel_slot(&mut channels, &mut by_node, &node)
                        .rotation_keys
                        .extend(keys);
                }
                ReadOutputs::Translations(x) => {
                    let values =
                        key_values(x.collect::<Vec<_>>(), interpolation);
                    let keys = times.iter().zip(values).map(|(&time, v)| {
                        PositionKey {
                            time,
                            value: glm::vec3(v[0], v[1], v[2]),
                        }
                    });
                    channel_slot(&mut channels, &mut by_node, &node)
                        .position_keys
                        .extend(keys);
                }
                ReadOutputs::Scales(_) => {
                    warn!(
                        "animation {} node {} scale ignored",
                        animation.index(),
                        node.index()
                    );
                }
                ReadOutputs::MorphTargetWeights(_) => {
                    error!("Morphing not supported");
                    return Err(ImportError::Morphing.into());
                }
            }
        }

        // Store
        let name = animation.name().map_or_else(
            || format!("animation.{}", animation.index()),
            ToString::to_string,
        );
        ret.push(ImportAnimation {
            name,
            duration,
            // glTF times are plain seconds with no tick rate
            ticks_per_second: 0.0,
            channels,
        });
    }
    Ok(ret)
}
