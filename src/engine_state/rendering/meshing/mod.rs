//! Mesh generation and management for voxel rendering.
//!
//! This module turns voxel data into GPU-friendly buffers. Drawing them is the
//! renderer's job; the engine only produces and replaces them.

pub mod mesh;

pub use mesh::{Face, Mesh, MeshBuffers, FACES};
