//! Procedural generation for the infinite flight terrain.

pub mod chunk_cache;
pub mod heightfield;
pub mod terrain;

pub use chunk_cache::*;
pub use heightfield::*;
pub use terrain::*;
