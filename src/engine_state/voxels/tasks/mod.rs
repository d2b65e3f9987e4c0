//! # Voxel Task System
//!
//! This module contains the jobs the chunk manager hands to the worker pool.
//! They read only their own inputs and return owned results, so nothing in
//! here ever touches the world map.

pub mod chunk_generation_task;

pub use chunk_generation_task::{ChunkGenerationTask, ChunkTicket};
