//! # Voxel Engine Core
//!
//! This module contains the voxel world itself: block types, coordinate
//! spaces, terrain rules, chunks, the shared world map, user edits and the
//! chunk lifecycle scheduler.
//!
//! ## Architecture
//!
//! * **Block**: block types, their textures, and the six block sides
//! * **Terrain**: deterministic height and classification rules
//! * **Chunk**: sparse storage, generation and meshing of one 8x8x8 cell
//! * **World**: the single voxel map meshing, collision and ray casts read
//! * **Edits**: the persisted overlay of placed and mined voxels
//! * **Chunk Manager**: keep-set, worker hand-off and per-tick budgets
//! * **Tasks**: the generation job executed by the worker pool
//!
//! ## Data Flow
//!
//! 1. The chunk manager decides which chunks must exist around the observer
//! 2. Workers compute their blocks from the terrain rules alone
//! 3. The owning thread publishes the blocks, re-applies edits and meshes
//! 4. Mine and place go through the world map, the owning chunk and the edit store

pub mod block;
pub mod chunk;
pub mod chunk_manager;
pub mod coordinates;
pub mod edits;
pub mod tasks;
pub mod terrain;
pub mod world;
