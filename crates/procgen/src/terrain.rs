//! Terrain chunk generation.
//!
//! Each chunk is a `resolution x resolution` grid of cells covering a square of
//! `chunk_size` world units. Cells are emitted as two unindexed triangles with a single
//! flat normal shared by both, and every position is already in world space, so chunks
//! are drawn with an identity model matrix.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::heightfield::HeightField;

/// Integer grid coordinate of a terrain chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing a world-space position. Chunk `(cx, cz)` spans
    /// `[cx * size, (cx + 1) * size)` on each axis.
    pub fn containing(world_x: f32, world_z: f32, chunk_size: f32) -> Self {
        Self {
            x: (world_x / chunk_size).floor() as i32,
            z: (world_z / chunk_size).floor() as i32,
        }
    }

    /// Chessboard distance in chunks.
    pub fn chebyshev_distance(&self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/// Vertex for terrain mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Configuration for chunk generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkSettings {
    /// Side length of a chunk in world units.
    pub chunk_size: f32,
    /// Cells per side.
    pub resolution: u32,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            chunk_size: 40.0,
            resolution: 20,
        }
    }
}

impl ChunkSettings {
    /// Vertices emitted per chunk (two triangles per cell, unindexed).
    pub fn vertices_per_chunk(&self) -> usize {
        let res = self.cells_per_side() as usize;
        res * res * 6
    }

    /// `resolution`, with a zero treated as a single cell.
    pub fn cells_per_side(&self) -> u32 {
        self.resolution.max(1)
    }
}

/// A generated, immutable terrain tile.
#[derive(Debug, Clone)]
pub struct TerrainChunk {
    pub coord: ChunkCoord,
    pub vertices: Vec<TerrainVertex>,
}

impl TerrainChunk {
    /// Generate the mesh for `coord`.
    pub fn generate(coord: ChunkCoord, settings: &ChunkSettings, heights: &HeightField) -> Self {
        let res = settings.cells_per_side();
        let size = settings.chunk_size;
        let dx = coord.x as f32 * size;
        let dz = coord.z as f32 * size;

        let mut vertices = Vec::with_capacity(settings.vertices_per_chunk());

        for z in 0..res {
            for x in 0..res {
                let x0 = (x as f32 / res as f32) * size + dx;
                let x1 = ((x + 1) as f32 / res as f32) * size + dx;
                let z0 = (z as f32 / res as f32) * size + dz;
                let z1 = ((z + 1) as f32 / res as f32) * size + dz;

                let p00 = Vec3::new(x0, heights.height(x0, z0), z0);
                let p10 = Vec3::new(x1, heights.height(x1, z0), z0);
                let p01 = Vec3::new(x0, heights.height(x0, z1), z1);
                let p11 = Vec3::new(x1, heights.height(x1, z1), z1);

                // One normal per cell, taken from the first triangle and oriented up.
                let normal: [f32; 3] = flat_normal(p00, p10, p11).into();

                let push = |out: &mut Vec<TerrainVertex>, p: Vec3, uv: [f32; 2]| {
                    out.push(TerrainVertex {
                        position: p.into(),
                        normal,
                        uv,
                    });
                };

                push(&mut vertices, p00, [0.0, 0.0]);
                push(&mut vertices, p10, [1.0, 0.0]);
                push(&mut vertices, p11, [1.0, 1.0]);

                push(&mut vertices, p00, [0.0, 0.0]);
                push(&mut vertices, p11, [1.0, 1.0]);
                push(&mut vertices, p01, [0.0, 1.0]);
            }
        }

        log::debug!(
            "Generated terrain chunk ({}, {}): {} vertices",
            coord.x,
            coord.z,
            vertices.len()
        );

        Self { coord, vertices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Surface normal of triangle (p00, p10, p11) facing +Y.
fn flat_normal(p00: Vec3, p10: Vec3, p11: Vec3) -> Vec3 {
    let n = (p11 - p00).cross(p10 - p00).normalize_or_zero();
    if n == Vec3::ZERO {
        Vec3::Y
    } else {
        n
    }
}

/// The `(2r+1)^2` square of chunk coordinates centred on the player's chunk.
pub fn visible_chunks(player_x: f32, player_z: f32, chunk_size: f32, radius: i32) -> Vec<ChunkCoord> {
    let center = ChunkCoord::containing(player_x, player_z, chunk_size);
    let radius = radius.max(0);
    let side = (2 * radius + 1) as usize;
    let mut coords = Vec::with_capacity(side * side);
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            coords.push(ChunkCoord::new(
                center.x.saturating_add(dx),
                center.z.saturating_add(dz),
            ));
        }
    }
    coords
}
