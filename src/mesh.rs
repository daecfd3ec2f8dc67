use crate::import::{ImportMaterial, ImportMesh};
use log::{debug, info, warn};
use nalgebra_glm as glm;
use std::{path::PathBuf, sync::Arc};

/// Surface colours of a mesh. Meshes using the same material share it
/// through an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: glm::Vec4,
    pub specular: glm::Vec4,
    pub ambient: glm::Vec4,
    pub emission: glm::Vec4,
    pub shininess: f32,
    /// Diffuse texture. Not loaded here.
    pub texture: Option<PathBuf>,
}

impl Material {
    #[must_use]
    pub fn from_import(import: &ImportMaterial) -> Self {
        Self {
            name: import.name.clone(),
            diffuse: glm::make_vec4(&import.diffuse),
            specular: glm::make_vec4(&import.specular),
            ambient: glm::make_vec4(&import.ambient),
            emission: glm::make_vec4(&import.emission),
            shininess: import.shininess,
            texture: if import.colour_filename.is_empty() {
                None
            } else {
                Some(PathBuf::from(&import.colour_filename))
            },
        }
    }
}

/// An already constructed mesh. Scene graph mesh nodes and animated meshes
/// both hold it through an `Arc`, so the mesh list is the single owner of
/// the data and binding never copies it.
#[derive(Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<glm::Vec3>,
    pub normals: Vec<glm::Vec3>,
    pub tex_coords: Vec<Vec<[f32; 2]>>,
    pub colours: Vec<glm::Vec3>,
    /// Triangle list
    pub indices: Vec<u32>,
    pub material_id: usize,
    /// `None` if `material_id` is not in the material list
    pub material: Option<Arc<Material>>,
}

impl Mesh {
    /// Copies the geometry of `import` and picks its material out of
    /// `materials`
    #[must_use]
    pub fn from_import(
        import: &ImportMesh,
        materials: &[Arc<Material>],
    ) -> Self {
        let material = materials.get(import.material_id).cloned();
        if material.is_none() && !materials.is_empty() {
            warn!(
                "mesh {:?} uses material {} but there are only {}",
                import.name,
                import.material_id,
                materials.len()
            );
        }
        debug!(
            "mesh {:?} vertices={}, triangles={}, uv sets={}, colours={}",
            import.name,
            import.vertex_count(),
            import.indices.len() / 3,
            import.tex_coords.len(),
            !import.colours.is_empty(),
        );
        Self {
            name: import.name.clone(),
            positions: import.positions.clone(),
            normals: import.normals.clone(),
            tex_coords: import.tex_coords.clone(),
            colours: import.colours.clone(),
            indices: import.indices.clone(),
            material_id: import.material_id,
            material,
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Creates the shared material objects, in import order
#[must_use]
pub fn build_materials(imports: &[ImportMaterial]) -> Vec<Arc<Material>> {
    info!("NumMaterials={}", imports.len());
    imports
        .iter()
        .map(|m| Arc::new(Material::from_import(m)))
        .collect()
}

/// Creates the mesh objects for an import mesh list, in the same order, so
/// that import mesh index `i` is `meshes[i]`. This has to run before the
/// binding pass since skinning refers back to these objects.
#[must_use]
pub fn build_meshes(
    imports: &[ImportMesh],
    materials: &[Arc<Material>],
) -> Vec<Arc<Mesh>> {
    info!("meshCount={}", imports.len());
    imports
        .iter()
        .map(|m| Arc::new(Mesh::from_import(m, materials)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meshes_share_materials() {
        let materials = build_materials(&[
            ImportMaterial {
                name: "red".to_string(),
                diffuse: [1.0, 0.0, 0.0, 1.0],
                colour_filename: "textures/red.png".to_string(),
                ..Default::default()
            },
            ImportMaterial::default(),
        ]);
        let imports = vec![
            ImportMesh {
                name: "a".to_string(),
                positions: vec![glm::Vec3::zeros(); 3],
                indices: vec![0, 1, 2],
                ..Default::default()
            },
            ImportMesh {
                name: "b".to_string(),
                ..Default::default()
            },
            ImportMesh {
                name: "c".to_string(),
                material_id: 7,
                ..Default::default()
            },
        ];
        let meshes = build_meshes(&imports, &materials);
        assert_eq!(meshes[0].vertex_count(), 3);
        assert_eq!(meshes[0].triangle_count(), 1);
        let red = meshes[0].material.as_ref().unwrap();
        assert!(Arc::ptr_eq(red, &materials[0]));
        assert!(Arc::ptr_eq(meshes[1].material.as_ref().unwrap(), red));
        assert_eq!(red.diffuse, glm::vec4(1.0, 0.0, 0.0, 1.0));
        assert_eq!(red.texture, Some(PathBuf::from("textures/red.png")));
        assert!(materials[1].texture.is_none());
        assert!(meshes[2].material.is_none());
    }
}
