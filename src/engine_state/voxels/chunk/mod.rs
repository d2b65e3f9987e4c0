//! # Chunk Module
//!
//! This module provides the `Chunk` struct: one 8x8x8 cell of the world, its
//! sparse block storage, its generation progress and its derived mesh.
//!
//! ## Storage
//!
//! Only solid voxels are stored, keyed by local position. Air is the absence
//! of an entry, so a chunk of open sky costs nothing beyond the map header.
//!
//! ## Generation
//!
//! A chunk can be filled in two ways:
//! - [`Chunk::generate_all`] computes every block at once without touching any
//!   shared state. Worker threads use this.
//! - [`Chunk::generate_next_plane`] fills one horizontal plane per call, bottom
//!   up, writing into both the chunk and the attached world map. The owning
//!   thread uses this to spread a late chunk over several ticks.
//!
//! ## Meshing
//!
//! [`Chunk::build_mesh`] rebuilds the mesh from scratch. With culling on, a face
//! is skipped when the voxel on its far side is solid in the world map, which
//! includes voxels of the neighbouring chunks.

use std::collections::{HashMap, VecDeque};

use cgmath::Point3;

use crate::{
    core::StResource,
    engine_state::rendering::meshing::{Mesh, FACES},
};

use super::{
    block::block_type::BlockType,
    coordinates::{
        chunk_origin, local_to_voxel, voxel_to_chunk_and_local, ChunkPosition, LocalPosition,
        VoxelPosition,
    },
    edits::{Edit, EditStore},
    terrain::{classify_voxel, TerrainGenerator, WORLD_HEIGHT},
    world::WorldBlockMap,
};

/// The dimension (width, depth and height) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 8;
/// The number of blocks in a single horizontal plane of a chunk.
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk.
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;
/// Number of chunk layers stacked vertically inside the generated world band.
pub const WORLD_HEIGHT_IN_CHUNKS: i32 = WORLD_HEIGHT / CHUNK_DIMENSION;

/// Solid blocks of one chunk keyed by local position.
pub type ChunkBlocks = HashMap<LocalPosition, BlockType>;

/// One cubic cell of the voxel world.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    position: ChunkPosition,
    /// Solid blocks only; a missing local position is air.
    blocks: ChunkBlocks,
    /// Local z planes still to generate, lowest first.
    pending_planes: VecDeque<i32>,
    /// Geometry from the most recent `build_mesh` call.
    mesh: Mesh,
    /// Shared world map this chunk publishes into, when attached.
    world: Option<StResource<WorldBlockMap>>,
}

impl Chunk {
    /// Creates an empty chunk with every plane still pending.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `world` - World map to publish generated blocks into, if any
    pub fn new(position: ChunkPosition, world: Option<StResource<WorldBlockMap>>) -> Self {
        Chunk {
            position,
            blocks: HashMap::new(),
            pending_planes: (0..CHUNK_DIMENSION).collect(),
            mesh: Mesh::new(),
            world,
        }
    }

    /// Creates a fully generated chunk from precomputed blocks.
    ///
    /// When a world map is attached, every block is published into it.
    pub fn from_blocks(
        position: ChunkPosition,
        blocks: ChunkBlocks,
        world: Option<StResource<WorldBlockMap>>,
    ) -> Self {
        if let Some(world) = &world {
            let mut world = world.get_mut();
            for (local, block_type) in &blocks {
                world.set(local_to_voxel(position, *local), *block_type);
            }
        }

        Chunk {
            position,
            blocks,
            pending_planes: VecDeque::new(),
            mesh: Mesh::new(),
            world,
        }
    }

    /// Computes every solid block of the chunk at `position`.
    ///
    /// Pure: it reads nothing but the generator, so it is safe to call from a
    /// worker thread. Chunks outside the generated vertical band are empty.
    pub fn generate_all(position: ChunkPosition, terrain: &TerrainGenerator) -> ChunkBlocks {
        let mut blocks = HashMap::new();
        if !(0..WORLD_HEIGHT_IN_CHUNKS).contains(&position.z) {
            return blocks;
        }

        let origin = chunk_origin(position);
        for y in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let height = terrain.height_at(origin.x + x, origin.y + y);
                for z in (0..CHUNK_DIMENSION).rev() {
                    if let Some(block_type) =
                        classify_voxel(origin.x + x, origin.y + y, origin.z + z, height)
                    {
                        blocks.insert(Point3::new(x, y, z), block_type);
                    }
                }
            }
        }

        blocks
    }

    /// Generates the lowest pending plane.
    ///
    /// # Returns
    /// `true` while more planes remain after this one.
    pub fn generate_next_plane(&mut self, terrain: &TerrainGenerator) -> bool {
        let Some(z) = self.pending_planes.pop_front() else {
            return false;
        };

        let origin = chunk_origin(self.position);
        if (0..WORLD_HEIGHT_IN_CHUNKS).contains(&self.position.z) {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    let height = terrain.height_at(origin.x + x, origin.y + y);
                    if let Some(block_type) =
                        classify_voxel(origin.x + x, origin.y + y, origin.z + z, height)
                    {
                        self.set_block(Point3::new(x, y, z), block_type);
                    }
                }
            }
        }

        !self.pending_planes.is_empty()
    }

    /// Whether every plane has been generated.
    pub fn is_fully_generated(&self) -> bool {
        self.pending_planes.is_empty()
    }

    /// Number of planes still waiting for `generate_next_plane`.
    pub fn pending_plane_count(&self) -> usize {
        self.pending_planes.len()
    }

    /// The position of this chunk in chunk coordinates.
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    /// Block at a local position, `None` for air.
    pub fn get_block(&self, local: LocalPosition) -> Option<BlockType> {
        self.blocks.get(&local).copied()
    }

    /// Stores a block in this chunk and in the attached world map.
    pub fn set_block(&mut self, local: LocalPosition, block_type: BlockType) -> Option<BlockType> {
        if let Some(world) = &self.world {
            world
                .get_mut()
                .set(local_to_voxel(self.position, local), block_type);
        }
        self.blocks.insert(local, block_type)
    }

    /// Clears a local voxel to air in this chunk and in the attached world map.
    pub fn remove_block(&mut self, local: LocalPosition) -> Option<BlockType> {
        if let Some(world) = &self.world {
            world.get_mut().remove(local_to_voxel(self.position, local));
        }
        self.blocks.remove(&local)
    }

    /// Number of solid voxels.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// All solid blocks of the chunk.
    pub fn blocks(&self) -> &ChunkBlocks {
        &self.blocks
    }

    /// Overrides generated blocks with every edit that falls inside this chunk.
    ///
    /// Returns the number of edits applied.
    pub fn apply_edits(&mut self, edits: &EditStore) -> usize {
        let chunk_edits = edits.edits_in_chunk(self.position);
        for (voxel, edit) in &chunk_edits {
            let (_, local) = voxel_to_chunk_and_local(*voxel);
            match edit {
                Edit::Place(block_type) => {
                    self.set_block(local, *block_type);
                }
                Edit::ForcedAir => {
                    self.remove_block(local);
                }
            }
        }
        chunk_edits.len()
    }

    /// Rebuilds the mesh from scratch.
    ///
    /// # Arguments
    /// * `cull` - Skip faces whose neighbouring voxel is solid. When `false`,
    ///   every face of every solid voxel is emitted.
    pub fn build_mesh(&mut self, cull: bool) {
        let mut mesh = Mesh::new();
        {
            let world = self.world.as_ref().map(StResource::get);

            for z in 0..CHUNK_DIMENSION {
                for y in 0..CHUNK_DIMENSION {
                    for x in 0..CHUNK_DIMENSION {
                        let local = Point3::new(x, y, z);
                        let Some(block_type) = self.blocks.get(&local).copied() else {
                            continue;
                        };
                        let voxel = local_to_voxel(self.position, local);

                        for face in &FACES {
                            if cull {
                                let neighbour = voxel + face.normal_vector();
                                let hidden = match &world {
                                    Some(world) => world.contains(neighbour),
                                    None => self.contains_voxel(neighbour),
                                };
                                if hidden {
                                    continue;
                                }
                            }
                            mesh.push_face(block_type, voxel, face);
                        }
                    }
                }
            }
        }
        self.mesh = mesh;
    }

    /// Geometry from the most recent `build_mesh` call.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Releases the chunk.
    ///
    /// With `purge` set and a world map attached, every voxel inside this
    /// chunk's bounds is removed from the map as well.
    ///
    /// # Returns
    /// Number of voxels purged from the world map.
    pub fn destroy(self, purge: bool) -> usize {
        match (&self.world, purge) {
            (Some(world), true) => world.get_mut().purge_chunk(self.position),
            _ => 0,
        }
    }

    fn contains_voxel(&self, voxel: VoxelPosition) -> bool {
        let (chunk, local) = voxel_to_chunk_and_local(voxel);
        chunk == self.position && self.blocks.contains_key(&local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::terrain::NoiseParameters;

    fn terrain() -> TerrainGenerator {
        TerrainGenerator::new(NoiseParameters::default())
    }

    #[test]
    fn generate_all_is_deterministic() {
        let terrain = terrain();
        let position = Point3::new(3, -2, 0);
        assert_eq!(
            Chunk::generate_all(position, &terrain),
            Chunk::generate_all(position, &terrain)
        );
        assert_eq!(
            Chunk::generate_all(position, &terrain),
            Chunk::generate_all(position, &TerrainGenerator::new(NoiseParameters::default()))
        );
    }

    #[test]
    fn generate_all_matches_natural_block() {
        let terrain = terrain();
        let position = Point3::new(-1, 2, 1);
        let blocks = Chunk::generate_all(position, &terrain);

        for z in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    let local = Point3::new(x, y, z);
                    let natural = terrain.natural_block(local_to_voxel(position, local));
                    assert_eq!(blocks.get(&local).copied(), natural);
                }
            }
        }
    }

    #[test]
    fn bottom_layer_is_never_empty() {
        let blocks = Chunk::generate_all(Point3::new(0, 0, 0), &terrain());
        for y in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                assert!(blocks.contains_key(&Point3::new(x, y, 0)));
            }
        }
    }

    #[test]
    fn chunks_outside_the_world_band_are_empty() {
        let terrain = terrain();
        assert!(Chunk::generate_all(Point3::new(0, 0, -1), &terrain).is_empty());
        assert!(Chunk::generate_all(Point3::new(0, 0, WORLD_HEIGHT_IN_CHUNKS), &terrain).is_empty());
    }

    #[test]
    fn planes_fill_the_same_blocks_as_generate_all() {
        let terrain = terrain();
        let position = Point3::new(1, 1, 0);
        let world = StResource::new(WorldBlockMap::new());
        let mut chunk = Chunk::new(position, Some(world.clone()));

        let mut calls = 0;
        while chunk.generate_next_plane(&terrain) {
            calls += 1;
        }
        assert_eq!(calls + 1, CHUNK_DIMENSION);
        assert!(chunk.is_fully_generated());
        assert!(!chunk.generate_next_plane(&terrain));

        assert_eq!(chunk.blocks(), &Chunk::generate_all(position, &terrain));
        assert_eq!(world.get().len(), chunk.block_count());
    }

    #[test]
    fn from_blocks_publishes_into_world() {
        let world = StResource::new(WorldBlockMap::new());
        let mut blocks = HashMap::new();
        blocks.insert(Point3::new(0, 0, 0), BlockType::SAND);

        let chunk = Chunk::from_blocks(Point3::new(-1, 0, 0), blocks, Some(world.clone()));
        assert!(chunk.is_fully_generated());
        assert_eq!(world.get().get(Point3::new(-8, 0, 0)), Some(BlockType::SAND));
    }

    #[test]
    fn edits_override_generated_blocks() {
        let terrain = terrain();
        let position = Point3::new(0, 0, 0);
        let world = StResource::new(WorldBlockMap::new());

        let mut edits = EditStore::new();
        edits.record(Point3::new(0, 0, 0), Edit::ForcedAir);
        edits.record(Point3::new(1, 0, 0), Edit::Place(BlockType::OAK_PLANK));
        edits.record(Point3::new(9, 0, 0), Edit::ForcedAir);

        let mut chunk = Chunk::from_blocks(
            position,
            Chunk::generate_all(position, &terrain),
            Some(world.clone()),
        );
        assert_eq!(chunk.apply_edits(&edits), 2);

        assert_eq!(chunk.get_block(Point3::new(0, 0, 0)), None);
        assert!(!world.get().contains(Point3::new(0, 0, 0)));
        assert_eq!(chunk.get_block(Point3::new(1, 0, 0)), Some(BlockType::OAK_PLANK));
        assert_eq!(world.get().get(Point3::new(1, 0, 0)), Some(BlockType::OAK_PLANK));
    }

    fn two_block_chunk(world: Option<StResource<WorldBlockMap>>) -> Chunk {
        let mut blocks = HashMap::new();
        blocks.insert(Point3::new(2, 2, 2), BlockType::STONE);
        blocks.insert(Point3::new(3, 2, 2), BlockType::DIRT);
        Chunk::from_blocks(Point3::new(0, 0, 0), blocks, world)
    }

    #[test]
    fn culling_removes_shared_faces() {
        let world = StResource::new(WorldBlockMap::new());
        let mut chunk = two_block_chunk(Some(world));

        chunk.build_mesh(false);
        assert_eq!(chunk.mesh().quad_count(), 12);

        chunk.build_mesh(true);
        assert_eq!(chunk.mesh().quad_count(), 10);
        assert_eq!(chunk.mesh().buffers_for(BlockType::STONE).unwrap().quad_count(), 5);
        assert_eq!(chunk.mesh().buffers_for(BlockType::DIRT).unwrap().quad_count(), 5);
    }

    #[test]
    fn detached_chunk_culls_against_itself() {
        let mut chunk = two_block_chunk(None);
        chunk.build_mesh(true);
        assert_eq!(chunk.mesh().quad_count(), 10);
    }

    #[test]
    fn culling_sees_neighbouring_chunks() {
        let world = StResource::new(WorldBlockMap::new());
        let mut blocks = HashMap::new();
        blocks.insert(Point3::new(7, 0, 0), BlockType::STONE);
        let mut chunk = Chunk::from_blocks(Point3::new(0, 0, 0), blocks, Some(world.clone()));

        chunk.build_mesh(true);
        assert_eq!(chunk.mesh().quad_count(), 6);

        world.get_mut().set(Point3::new(8, 0, 0), BlockType::STONE);
        chunk.build_mesh(true);
        assert_eq!(chunk.mesh().quad_count(), 5);
    }

    #[test]
    fn empty_chunk_has_empty_mesh() {
        let mut chunk = Chunk::from_blocks(Point3::new(0, 0, 5), HashMap::new(), None);
        chunk.build_mesh(true);
        assert!(chunk.mesh().is_empty());
    }

    #[test]
    fn destroy_purges_only_when_asked() {
        let world = StResource::new(WorldBlockMap::new());
        let chunk = two_block_chunk(Some(world.clone()));
        assert_eq!(chunk.destroy(false), 0);
        assert_eq!(world.get().len(), 2);

        let chunk = two_block_chunk(Some(world.clone()));
        assert_eq!(chunk.destroy(true), 2);
        assert!(world.get().is_empty());
    }
}
