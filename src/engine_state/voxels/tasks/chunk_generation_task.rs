//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, which computes the blocks of
//! one chunk on a worker thread. The chunk manager schedules one for every
//! chunk coordinate that enters the keep-set.

use std::sync::Arc;

use crate::engine_state::{
    task_management::task::Task,
    voxels::{
        chunk::{Chunk, ChunkBlocks},
        coordinates::ChunkPosition,
        terrain::TerrainGenerator,
    },
};

/// Identifies one scheduling of a chunk coordinate.
///
/// The ticket increases every time the same coordinate is scheduled, so a
/// result from an earlier scheduling can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkTicket {
    /// The chunk being generated
    pub position: ChunkPosition,
    /// Scheduling number handed out by the chunk manager
    pub ticket: u64,
}

/// A task that generates chunk data on a worker.
pub struct ChunkGenerationTask {
    /// Shared, immutable terrain rules
    terrain: Arc<TerrainGenerator>,
    /// Which chunk, and which scheduling of it
    ticket: ChunkTicket,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `terrain` - The generator shared by every worker
    /// * `ticket` - The chunk coordinates and scheduling number
    pub fn new(terrain: Arc<TerrainGenerator>, ticket: ChunkTicket) -> Self {
        ChunkGenerationTask { terrain, ticket }
    }
}

impl Task for ChunkGenerationTask {
    type Key = ChunkTicket;
    type Output = ChunkBlocks;

    fn key(&self) -> ChunkTicket {
        self.ticket
    }

    fn process(&self) -> ChunkBlocks {
        Chunk::generate_all(self.ticket.position, &self.terrain)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::engine_state::voxels::terrain::NoiseParameters;

    #[test]
    fn test_task_generates_its_chunk() {
        let terrain = Arc::new(TerrainGenerator::new(NoiseParameters::default()));
        let ticket = ChunkTicket {
            position: Point3::new(2, 0, 1),
            ticket: 7,
        };
        let task = ChunkGenerationTask::new(terrain.clone(), ticket);

        assert_eq!(task.key(), ticket);
        assert_eq!(task.process(), Chunk::generate_all(ticket.position, &terrain));
    }
}
