//! Rendering data for the voxel engine.
//!
//! This module contains the renderer-facing output of the engine: the vertex
//! format and the per-chunk meshes built from the shared face table. It holds
//! no GPU state.

pub mod meshing;
mod vertex;

// Re-export commonly used types
pub use meshing::{Mesh, MeshBuffers};
pub use vertex::Vertex;
