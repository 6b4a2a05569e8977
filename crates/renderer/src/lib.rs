//! wgpu rendering backend for Paper Plane: meshes, textures, cubemaps, materials and
//! the per-frame draw submission.

pub mod camera;
pub mod material;
pub mod mesh;
pub mod model;
pub mod pipeline;
pub mod renderer;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use material::*;
pub use mesh::*;
pub use model::*;
pub use pipeline::*;
pub use renderer::*;
pub use texture::*;
pub use vertex::*;
