//! glTF model loading into CPU-side triangle data.

use std::path::{Path, PathBuf};

use glam::{Mat3, Mat4, Vec3};

use crate::mesh::MeshData;
use crate::vertex::Vertex;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to load glTF file {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("model {0} contains no triangles")]
    Empty(PathBuf),

    #[error("model has degenerate bounds (largest extent {extent})")]
    DegenerateBounds { extent: f32 },
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn largest_extent(&self) -> f32 {
        self.size().max_element()
    }
}

/// Flattened triangle mesh: one position/normal/uv per vertex, indexed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl ModelData {
    /// Load every triangle primitive of the default scene (or all scenes) with node
    /// transforms applied. Normals are computed when any primitive lacks them.
    pub fn load_gltf(path: &Path) -> Result<Self, ModelError> {
        let (document, buffers, _images) = gltf::import(path).map_err(|source| ModelError::Gltf {
            path: path.to_path_buf(),
            source,
        })?;

        let mut model = ModelData::default();
        let mut missing_normals = false;

        let scenes: Vec<gltf::Scene> = match document.default_scene() {
            Some(scene) => vec![scene],
            None => document.scenes().collect(),
        };
        for scene in scenes {
            for node in scene.nodes() {
                append_node(&node, Mat4::IDENTITY, &buffers, &mut model, &mut missing_normals);
            }
        }

        if model.indices.is_empty() {
            return Err(ModelError::Empty(path.to_path_buf()));
        }
        if missing_normals {
            model.compute_normals();
        }

        log::debug!(
            "Loaded model {}: {} vertices, {} triangles",
            path.display(),
            model.positions.len(),
            model.indices.len() / 3
        );
        Ok(model)
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Aabb { min, max })
    }

    /// Translate by `shift`, then scale uniformly.
    pub fn shift_and_scale(&mut self, shift: Vec3, scale: f32) {
        for p in &mut self.positions {
            *p = (*p + shift) * scale;
        }
    }

    /// Re-centre on the origin and scale so the largest extent is 1.
    pub fn normalize_to_unit(&mut self) -> Result<(), ModelError> {
        let bounds = self
            .bounding_box()
            .ok_or(ModelError::DegenerateBounds { extent: 0.0 })?;
        let extent = bounds.largest_extent();
        if !extent.is_finite() || extent <= 0.0 {
            return Err(ModelError::DegenerateBounds { extent });
        }
        self.shift_and_scale(-bounds.center(), 1.0 / extent);
        Ok(())
    }

    /// Smooth per-vertex normals from area-weighted face normals.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(&pa), Some(&pb), Some(&pc)) =
                (self.positions.get(a), self.positions.get(b), self.positions.get(c))
            else {
                continue;
            };
            let face = (pb - pa).cross(pc - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals.into_iter().map(|n| n.normalize_or(Vec3::Y)).collect();
    }

    pub fn to_mesh_data(&self) -> MeshData {
        let vertices = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Vertex::new(
                    (*p).into(),
                    self.normals.get(i).copied().unwrap_or(Vec3::Y).into(),
                    self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                )
            })
            .collect();
        MeshData {
            vertices,
            indices: self.indices.clone(),
        }
    }
}

fn append_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
    missing_normals: &mut bool,
) {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    let normal_transform = Mat3::from_mat4(transform).inverse().transpose();

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };

            let base = model.positions.len() as u32;
            let count = model.positions.len();
            model
                .positions
                .extend(positions.map(|p| transform.transform_point3(Vec3::from(p))));
            let added = model.positions.len() - count;

            match reader.read_normals() {
                Some(normals) => model.normals.extend(
                    normals.map(|n| (normal_transform * Vec3::from(n)).normalize_or(Vec3::Y)),
                ),
                None => {
                    *missing_normals = true;
                    model.normals.extend(std::iter::repeat(Vec3::Y).take(added));
                }
            }

            match reader.read_tex_coords(0) {
                Some(uvs) => model.tex_coords.extend(uvs.into_f32()),
                None => model.tex_coords.extend(std::iter::repeat([0.0, 0.0]).take(added)),
            }

            match reader.read_indices() {
                Some(indices) => model.indices.extend(indices.into_u32().map(|i| base + i)),
                None => model.indices.extend(base..base + added as u32),
            }
        }
    }

    for child in node.children() {
        append_node(&child, transform, buffers, model, missing_normals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(a: Vec3, b: Vec3, c: Vec3) -> ModelData {
        ModelData {
            positions: vec![a, b, c],
            normals: vec![Vec3::ZERO; 3],
            tex_coords: vec![[0.0, 0.0]; 3],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn normalize_centres_and_scales_to_unit() {
        let mut model = triangle(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(6.0, 0.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
        );
        model.normalize_to_unit().unwrap();
        let bounds = model.bounding_box().unwrap();
        assert!(bounds.center().length() < 1e-6);
        assert!((bounds.largest_extent() - 1.0).abs() < 1e-6);
        assert!((bounds.size().y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        let mut point = triangle(p, p, p);
        assert!(matches!(
            point.normalize_to_unit(),
            Err(ModelError::DegenerateBounds { .. })
        ));

        let mut empty = ModelData::default();
        assert!(empty.normalize_to_unit().is_err());

        let mut broken = triangle(Vec3::ZERO, Vec3::new(f32::INFINITY, 0.0, 0.0), Vec3::Y);
        assert!(broken.normalize_to_unit().is_err());
    }

    #[test]
    fn computed_normals_follow_winding() {
        let mut model = triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
        model.compute_normals();
        for n in &model.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn mesh_data_keeps_indices() {
        let model = triangle(Vec3::ZERO, Vec3::X, Vec3::Z);
        let data = model.to_mesh_data();
        assert_eq!(data.vertices.len(), 3);
        assert_eq!(data.indices, vec![0, 1, 2]);
        assert_eq!(data.vertices[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ModelData::load_gltf(Path::new("no/such/model.glb")).is_err());
    }
}
