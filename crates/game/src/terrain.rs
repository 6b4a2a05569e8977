//! GPU side of the chunked terrain: one mesh per cached chunk, drawn with an identity
//! model matrix because chunk vertices are already in world space.

use std::collections::HashMap;

use engine_core::{Mat4, Vec3};
use procgen::{ChunkCache, ChunkCoord, TerrainChunk, TerrainVertex};
use renderer::{
    DrawCommand, LightParams, LightSpace, Mesh, MeshDrawer, Renderer, SceneMatrices, Vertex,
};

/// Camera-relative light for the ground.
pub const TERRAIN_LIGHT: LightParams = LightParams {
    direction: Vec3::new(0.0, 1.0, 1.0),
    shininess: 1000.0,
    space: LightSpace::View,
};

pub struct TerrainRenderer {
    cache: ChunkCache,
    meshes: HashMap<ChunkCoord, Mesh>,
    visible: Vec<ChunkCoord>,
    drawer: MeshDrawer,
    view_radius: i32,
}

impl TerrainRenderer {
    pub fn new(cache: ChunkCache, drawer: MeshDrawer, view_radius: i32) -> Self {
        Self {
            cache,
            meshes: HashMap::new(),
            visible: Vec::new(),
            drawer,
            view_radius,
        }
    }

    /// Generate chunks around the player, upload any that lack a mesh and drop meshes
    /// for evicted chunks.
    pub fn update(&mut self, renderer: &Renderer, player_x: f32, player_z: f32) {
        for coord in self.cache.update(player_x, player_z, self.view_radius) {
            self.meshes.remove(&coord);
        }

        self.visible = self.cache.visible_chunks(player_x, player_z, self.view_radius);
        for &coord in &self.visible {
            if self.meshes.contains_key(&coord) {
                continue;
            }
            if let Some(chunk) = self.cache.get(coord) {
                let mesh = renderer.upload_mesh(&chunk_mesh_data(chunk));
                self.meshes.insert(coord, mesh);
            }
        }
    }

    pub fn draw_commands<'a>(&'a self, scene: &SceneMatrices) -> Vec<DrawCommand<'a>> {
        let material = self.drawer.material(true);
        drawable(&self.meshes, &self.visible)
            .map(|mesh| self.drawer.draw_mesh(mesh, material, scene, Mat4::IDENTITY))
            .collect()
    }

    pub fn cached_chunks(&self) -> usize {
        self.cache.len()
    }
}

/// Meshes for the visible coordinates; chunks without one are skipped this frame.
fn drawable<'a, M>(
    meshes: &'a HashMap<ChunkCoord, M>,
    visible: &'a [ChunkCoord],
) -> impl Iterator<Item = &'a M> + 'a {
    visible.iter().filter_map(move |coord| meshes.get(coord))
}

fn to_vertex(v: &TerrainVertex) -> Vertex {
    Vertex::new(v.position, v.normal, v.uv)
}

fn chunk_mesh_data(chunk: &TerrainChunk) -> renderer::MeshData {
    renderer::MeshData::from_triangles(chunk.vertices.iter().map(to_vertex).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgen::{ChunkSettings, HeightField};

    #[test]
    fn chunk_converts_to_indexed_triangles() {
        let settings = ChunkSettings {
            chunk_size: 40.0,
            resolution: 4,
        };
        let chunk = TerrainChunk::generate(ChunkCoord::new(1, 0), &settings, &HeightField::new(3));
        let data = chunk_mesh_data(&chunk);
        assert_eq!(data.vertices.len(), settings.vertices_per_chunk());
        assert_eq!(data.triangle_count(), 4 * 4 * 2);
        assert_eq!(data.vertices[0].position, chunk.vertices[0].position);
        assert_eq!(data.vertices[5].tex_coords, chunk.vertices[5].uv);
    }

    #[test]
    fn chunks_without_meshes_are_skipped() {
        let mut meshes = HashMap::new();
        meshes.insert(ChunkCoord::new(0, 0), "a");
        meshes.insert(ChunkCoord::new(5, 5), "far");
        let visible = [
            ChunkCoord::new(-1, 0),
            ChunkCoord::new(0, 0),
            ChunkCoord::new(1, 0),
        ];
        let drawn: Vec<_> = drawable(&meshes, &visible).collect();
        assert_eq!(drawn, vec![&"a"]);
    }

    #[test]
    fn ground_light_turns_with_the_camera() {
        assert_eq!(TERRAIN_LIGHT.space, LightSpace::View);
        assert_eq!(LightParams::default().space, LightSpace::World);
    }
}
