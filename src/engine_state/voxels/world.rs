//! # World Module
//!
//! `WorldBlockMap` is the authoritative answer to "what is solid here". It is
//! the union of every resident chunk's solid voxels plus applied edits, and it
//! is what meshing, collision and ray casting read in world coordinates.
//!
//! The map lives on the owning thread behind a [`StResource`](crate::core::StResource)
//! handle; worker threads never see it.

use std::collections::HashMap;

use cgmath::Point3;

use super::{
    block::block_type::BlockType,
    chunk::CHUNK_DIMENSION,
    coordinates::{local_to_voxel, ChunkPosition, VoxelPosition},
};

/// Sparse mapping from voxel position to block type. Absent means air.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorldBlockMap {
    blocks: HashMap<VoxelPosition, BlockType>,
}

impl WorldBlockMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block at `position`, or `None` for air.
    pub fn get(&self, position: VoxelPosition) -> Option<BlockType> {
        self.blocks.get(&position).copied()
    }

    /// Whether the voxel at `position` is solid.
    pub fn contains(&self, position: VoxelPosition) -> bool {
        self.blocks.contains_key(&position)
    }

    /// Stores a block, returning whatever was there before.
    pub fn set(&mut self, position: VoxelPosition, block_type: BlockType) -> Option<BlockType> {
        self.blocks.insert(position, block_type)
    }

    /// Clears a voxel back to air, returning the removed block.
    pub fn remove(&mut self, position: VoxelPosition) -> Option<BlockType> {
        self.blocks.remove(&position)
    }

    /// Number of solid voxels.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the map holds no solid voxel at all.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates every solid voxel in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelPosition, BlockType)> + '_ {
        self.blocks.iter().map(|(position, block_type)| (*position, *block_type))
    }

    /// Removes every voxel inside the bounds of `chunk`, returning how many were removed.
    pub fn purge_chunk(&mut self, chunk: ChunkPosition) -> usize {
        let mut removed = 0;
        for z in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    let voxel = local_to_voxel(chunk, Point3::new(x, y, z));
                    if self.blocks.remove(&voxel).is_some() {
                        removed += 1;
                    }
                }
            }
        }
        removed
    }
}
