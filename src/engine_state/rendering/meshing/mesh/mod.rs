//! Mesh generation for voxel rendering.
//!
//! - [`Mesh`]: per-block-type vertex/index buffers of one chunk
//! - [`MeshBuffers`]: a single draw batch
//! - [`Face`] and [`FACES`]: the unit-cube face table every quad is built from

mod face;
mod mesh;

pub use face::{Face, FACES, FACE_UVS, QUAD_INDICES};
pub use mesh::*;
