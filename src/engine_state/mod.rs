//! # Engine State Module
//!
//! This module ties the voxel world together: the shared terrain generator,
//! the world block map, the edit store, the chunk scheduler, the observer's
//! hotbar and the physics queries that read the world.
//!
//! Everything here runs on the owning thread. Only the terrain generator
//! crosses into the worker pool, behind an `Arc`.
//!
//! ## Key Components
//!
//! * `voxels` - Terrain, chunks, the world map, edits and the chunk scheduler
//! * `physics` - Collision probing and targeting rays
//! * `rendering` - Face tables and per-block-type mesh buffers
//! * `task_management` - The worker pool running chunk generation
//! * `inventory` - Per-block-type counts and the hotbar
//! * `config` - Engine configuration loaded from JSON

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::{info, warn};
use thiserror::Error;

use crate::core::StResource;
use config::{ConfigError, EngineConfig};
use inventory::Inventory;
use physics::{CollisionProbe, Movement, RayHit};
use task_management::TaskManager;
use voxels::{
    block::block_type::BlockType,
    chunk_manager::{ChunkManager, TickReport},
    coordinates::{voxel_to_chunk_and_local, VoxelPosition},
    edits::{Edit, EditStore, EditStoreError},
    terrain::{TerrainGenerator, WORLD_HEIGHT},
    world::WorldBlockMap,
};

pub mod config;
pub mod inventory;
pub mod physics;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Height above the surface at which the observer is spawned.
pub const SPAWN_CLEARANCE: f32 = 10.0;

/// Errors surfaced by the engine to its driver.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration file could not be used
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The edit store could not be read or written
    #[error(transparent)]
    EditStore(#[from] EditStoreError),
}

/// Result of a mining attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MineOutcome {
    /// The block was removed and credited to the inventory
    Mined(BlockType),
    /// The targeted voxel was already air
    NothingThere,
    /// The ray did not hit anything within reach
    NoTarget,
}

/// Result of a placement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// The block was written into the world
    Placed(BlockType),
    /// The voxel is already solid
    Occupied,
    /// The voxel lies outside the generated vertical band
    OutOfBounds,
    /// The selected hotbar slot is empty
    NothingSelected,
    /// The ray did not hit anything within reach
    NoTarget,
}

/// The complete world state of one session.
pub struct EngineState {
    config: EngineConfig,
    terrain: Arc<TerrainGenerator>,
    world: StResource<WorldBlockMap>,
    edits: EditStore,
    chunk_manager: ChunkManager,
    inventory: Inventory,
    fast_mode: bool,
}

impl EngineState {
    /// Builds the engine from a configuration and the edits of a previous session.
    ///
    /// # Arguments
    /// * `config` - Validated engine configuration
    /// * `edits` - Player edits to overlay on generated terrain
    pub fn new(config: EngineConfig, edits: EditStore) -> Self {
        let terrain = Arc::new(TerrainGenerator::new(config.noise));
        let world = StResource::new(WorldBlockMap::new());
        let task_manager = TaskManager::new(config.worker_count);
        let chunk_manager = ChunkManager::new(
            config.chunk_settings(),
            Arc::clone(&terrain),
            world.clone(),
            task_manager,
        );

        info!(
            "Engine state created with {} workers and {} stored edits",
            config.worker_count,
            edits.len()
        );

        EngineState {
            config,
            terrain,
            world,
            edits,
            chunk_manager,
            inventory: Inventory::new(),
            fast_mode: false,
        }
    }

    /// Builds the engine, reading edits from the configured save file.
    pub fn load(config: EngineConfig) -> Result<Self, EngineError> {
        let edits = EditStore::load(&config.save_path)?;
        Ok(Self::new(config, edits))
    }

    /// Runs one scheduler tick for an observer at `observer`.
    ///
    /// The tick that completes the initial load carries the spawn position.
    pub fn tick(&mut self, observer: Point3<f32>) -> TickReport {
        let mut report = self.chunk_manager.tick(observer, self.fast_mode, &self.edits);
        if report.initial_load_completed {
            report.spawn = Some(self.spawn_position());
        }
        report
    }

    /// Where the observer starts: above the surface of the origin column.
    pub fn spawn_position(&self) -> Point3<f32> {
        let surface = self.terrain.height_at(0, 0) as f32;
        Point3::new(0.0, 0.0, surface + self.config.probe.height + SPAWN_CLEARANCE)
    }

    /// Whether fast (no-clip) mode is on.
    pub fn fast_mode(&self) -> bool {
        self.fast_mode
    }

    /// Switches fast mode on or off.
    pub fn set_fast_mode(&mut self, enabled: bool) {
        if self.fast_mode != enabled {
            info!("Fast mode {}", if enabled { "enabled" } else { "disabled" });
        }
        self.fast_mode = enabled;
    }

    /// Removes the block at `voxel` and credits it to the inventory.
    pub fn mine(&mut self, voxel: VoxelPosition) -> MineOutcome {
        let Some(block_type) = self.world.get().get(voxel) else {
            return MineOutcome::NothingThere;
        };

        let (chunk_position, local) = voxel_to_chunk_and_local(voxel);
        match self.chunk_manager.chunk_mut(chunk_position) {
            Some(chunk) => {
                chunk.remove_block(local);
            }
            None => {
                self.world.get_mut().remove(voxel);
            }
        }

        self.record_edit(voxel, None);
        self.chunk_manager.mark_voxel_changed(voxel);
        self.inventory.add(block_type, 1);
        info!("Mined {} at {:?}", block_type.name(), voxel);
        MineOutcome::Mined(block_type)
    }

    /// Writes `block_type` into the empty voxel at `voxel`.
    ///
    /// The inventory is not touched; see [`EngineState::place_selected`].
    pub fn place(&mut self, voxel: VoxelPosition, block_type: BlockType) -> PlaceOutcome {
        if !(0..WORLD_HEIGHT).contains(&voxel.z) {
            return PlaceOutcome::OutOfBounds;
        }
        if self.world.get().contains(voxel) {
            return PlaceOutcome::Occupied;
        }

        let (chunk_position, local) = voxel_to_chunk_and_local(voxel);
        match self.chunk_manager.chunk_mut(chunk_position) {
            Some(chunk) => {
                chunk.set_block(local, block_type);
            }
            None => {
                self.world.get_mut().set(voxel, block_type);
            }
        }

        self.record_edit(voxel, Some(block_type));
        self.chunk_manager.mark_voxel_changed(voxel);
        info!("Placed {} at {:?}", block_type.name(), voxel);
        PlaceOutcome::Placed(block_type)
    }

    /// Places one block of the selected hotbar type, consuming it on success.
    pub fn place_selected(&mut self, voxel: VoxelPosition) -> PlaceOutcome {
        let Some(block_type) = self.inventory.selected_block_type() else {
            return PlaceOutcome::NothingSelected;
        };

        let outcome = self.place(voxel, block_type);
        if outcome == PlaceOutcome::Placed(block_type) && !self.inventory.remove(block_type, 1) {
            warn!("Placed {} without any left in the inventory", block_type.name());
        }
        outcome
    }

    /// Casts the targeting ray from the observer's eye.
    pub fn cast_ray(&self, eye: Point3<f32>, direction: Vector3<f32>) -> Option<RayHit> {
        physics::cast_ray(
            &self.world.get(),
            eye,
            direction,
            self.config.reach,
            self.config.ray_step,
        )
    }

    /// Mines whatever the targeting ray hits first.
    pub fn mine_targeted(&mut self, eye: Point3<f32>, direction: Vector3<f32>) -> MineOutcome {
        match self.cast_ray(eye, direction) {
            Some(hit) => self.mine(hit.voxel),
            None => MineOutcome::NoTarget,
        }
    }

    /// Places the selected block in the empty voxel just before the ray's hit.
    pub fn place_targeted(&mut self, eye: Point3<f32>, direction: Vector3<f32>) -> PlaceOutcome {
        if self.inventory.selected_block_type().is_none() {
            return PlaceOutcome::NothingSelected;
        }
        match self.cast_ray(eye, direction).and_then(|hit| hit.last_empty) {
            Some(target) => self.place_selected(target),
            None => PlaceOutcome::NoTarget,
        }
    }

    /// The voxel a placement from `eye` along `direction` would fill, if any.
    pub fn ghost_preview(&self, eye: Point3<f32>, direction: Vector3<f32>) -> Option<VoxelPosition> {
        let target = self.cast_ray(eye, direction)?.last_empty?;
        let placeable = (0..WORLD_HEIGHT).contains(&target.z) && !self.world.get().contains(target);
        placeable.then_some(target)
    }

    /// Whether the observer's probe centred at `center` touches solid voxels.
    pub fn is_obstructed(&self, center: Point3<f32>) -> bool {
        physics::is_obstructed(&self.world.get(), center, &self.config.probe)
    }

    /// Applies `displacement` to the observer at `position`, stopping at solid voxels.
    pub fn resolve_movement(&self, position: Point3<f32>, displacement: Vector3<f32>) -> Movement {
        if self.fast_mode {
            return Movement {
                position: position + displacement,
                blocked_horizontal: false,
                blocked_vertical: false,
            };
        }
        physics::resolve_movement(&self.world.get(), position, displacement, &self.config.probe)
    }

    /// Writes the edit store to the configured save file.
    pub fn save(&self) -> Result<(), EngineError> {
        self.edits.save(&self.config.save_path)?;
        Ok(())
    }

    /// Stops the worker pool without waiting for it, then saves.
    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        self.chunk_manager.shutdown();
        self.save()
    }

    /// The configuration this engine runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The observer's collision probe.
    pub fn probe(&self) -> &CollisionProbe {
        &self.config.probe
    }

    /// The shared terrain generator.
    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    /// Handle to the world block map.
    pub fn world(&self) -> &StResource<WorldBlockMap> {
        &self.world
    }

    /// The player edits recorded so far.
    pub fn edits(&self) -> &EditStore {
        &self.edits
    }

    /// The chunk scheduler.
    pub fn chunk_manager(&self) -> &ChunkManager {
        &self.chunk_manager
    }

    /// The observer's inventory.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable access to the inventory, for hotbar selection.
    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    // An edit that restores the natural block is dropped rather than stored.
    fn record_edit(&mut self, voxel: VoxelPosition, resulting: Option<BlockType>) {
        if self.terrain.natural_block(voxel) == resulting {
            self.edits.remove(voxel);
        } else {
            self.edits.record(voxel, Edit::from(resulting));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxels::{chunk::Chunk, chunk_manager::ChunkState};

    fn engine() -> EngineState {
        let config = EngineConfig {
            worker_count: 0,
            ..EngineConfig::default()
        };
        EngineState::new(config, EditStore::new())
    }

    #[test]
    fn mining_a_natural_block_records_forced_air() {
        let mut engine = engine();
        let voxel = Point3::new(3, 4, 0);
        let natural = engine.terrain().natural_block(voxel).unwrap();
        engine.world().get_mut().set(voxel, natural);

        assert_eq!(engine.mine(voxel), MineOutcome::Mined(natural));
        assert!(!engine.world().get().contains(voxel));
        assert_eq!(engine.edits().get(voxel), Some(Edit::ForcedAir));
        assert_eq!(engine.inventory().count(natural), 1);
    }

    #[test]
    fn restoring_the_natural_block_drops_the_edit() {
        let mut engine = engine();
        let voxel = Point3::new(3, 4, 0);
        let natural = engine.terrain().natural_block(voxel).unwrap();
        engine.world().get_mut().set(voxel, natural);

        engine.mine(voxel);
        assert_eq!(engine.place(voxel, natural), PlaceOutcome::Placed(natural));
        assert!(engine.edits().is_empty());
    }

    #[test]
    fn mine_then_place_restores_a_resident_chunk() {
        let mut engine = engine();
        let position = Point3::new(0, 0, 0);
        let blocks = Chunk::generate_all(position, engine.terrain());
        let chunk = Chunk::from_blocks(position, blocks, Some(engine.world().clone()));
        engine.chunk_manager.insert_resident(chunk, ChunkState::MeshedCulled);

        let voxel = Point3::new(2, 5, 0);
        let natural = engine.terrain().natural_block(voxel).unwrap();
        let world_before = engine.world().get().clone();
        let edits_before = engine.edits().clone();

        assert_eq!(engine.mine(voxel), MineOutcome::Mined(natural));
        let chunk = engine.chunk_manager().chunk(position).unwrap();
        assert_eq!(chunk.get_block(voxel), None);
        assert!(!engine.world().get().contains(voxel));
        assert_eq!(engine.chunk_manager().state_of(position), ChunkState::Dirty);

        assert_eq!(engine.place(voxel, natural), PlaceOutcome::Placed(natural));
        let chunk = engine.chunk_manager().chunk(position).unwrap();
        assert_eq!(chunk.get_block(voxel), Some(natural));
        assert_eq!(*engine.world().get(), world_before);
        assert_eq!(engine.edits(), &edits_before);
    }

    #[test]
    fn placing_then_mining_in_the_air_leaves_no_edit() {
        let mut engine = engine();
        let voxel = Point3::new(0, 0, WORLD_HEIGHT - 1);
        assert_eq!(engine.terrain().natural_block(voxel), None);

        assert_eq!(engine.place(voxel, BlockType::STONE), PlaceOutcome::Placed(BlockType::STONE));
        assert_eq!(engine.edits().get(voxel), Some(Edit::Place(BlockType::STONE)));

        assert_eq!(engine.mine(voxel), MineOutcome::Mined(BlockType::STONE));
        assert!(engine.edits().is_empty());
    }

    #[test]
    fn mining_air_changes_nothing() {
        let mut engine = engine();
        assert_eq!(engine.mine(Point3::new(0, 0, 5)), MineOutcome::NothingThere);
        assert!(engine.edits().is_empty());
        assert_eq!(engine.inventory().selected_block_type(), None);
    }

    #[test]
    fn placement_is_rejected_when_occupied_or_out_of_band() {
        let mut engine = engine();
        let voxel = Point3::new(1, 1, 1);
        engine.world().get_mut().set(voxel, BlockType::DIRT);

        assert_eq!(engine.place(voxel, BlockType::STONE), PlaceOutcome::Occupied);
        assert_eq!(engine.world().get().get(voxel), Some(BlockType::DIRT));
        assert_eq!(
            engine.place(Point3::new(0, 0, WORLD_HEIGHT), BlockType::STONE),
            PlaceOutcome::OutOfBounds
        );
        assert_eq!(engine.place(Point3::new(0, 0, -1), BlockType::STONE), PlaceOutcome::OutOfBounds);
    }

    #[test]
    fn place_selected_needs_an_item() {
        let mut engine = engine();
        assert_eq!(
            engine.place_selected(Point3::new(0, 0, WORLD_HEIGHT - 1)),
            PlaceOutcome::NothingSelected
        );
    }

    #[test]
    fn targeted_edits_follow_the_ray() {
        let mut engine = engine();
        engine.world().get_mut().set(Point3::new(0, 0, 0), BlockType::STONE);
        engine.world().get_mut().set(Point3::new(1, 0, 0), BlockType::DIRT);
        let eye = Point3::new(0.5, 0.5, 3.5);
        let down = Vector3::new(0.0, 0.0, -1.0);

        assert_eq!(engine.ghost_preview(eye, down), Some(Point3::new(0, 0, 1)));
        assert_eq!(engine.place_targeted(eye, down), PlaceOutcome::NothingSelected);

        let side_eye = Point3::new(1.5, 0.5, 3.5);
        assert_eq!(engine.mine_targeted(side_eye, down), MineOutcome::Mined(BlockType::DIRT));
        assert_eq!(engine.mine_targeted(side_eye, down), MineOutcome::NoTarget);

        assert_eq!(engine.place_targeted(eye, down), PlaceOutcome::Placed(BlockType::DIRT));
        assert_eq!(engine.world().get().get(Point3::new(0, 0, 1)), Some(BlockType::DIRT));
        assert_eq!(engine.inventory().count(BlockType::DIRT), 0);
    }

    #[test]
    fn fast_mode_ignores_collision() {
        let mut engine = engine();
        engine.world().get_mut().set(Point3::new(2, 0, 0), BlockType::STONE);
        let start = Point3::new(0.5, 0.5, 3.5);
        let displacement = Vector3::new(2.0, 0.0, 0.0);

        assert!(engine.resolve_movement(start, displacement).blocked_horizontal);

        engine.set_fast_mode(true);
        let movement = engine.resolve_movement(start, displacement);
        assert!(!movement.blocked_horizontal);
        assert_eq!(movement.position, Point3::new(2.5, 0.5, 3.5));
    }

    #[test]
    fn spawn_is_above_the_origin_column() {
        let engine = engine();
        let surface = engine.terrain().height_at(0, 0) as f32;
        assert_eq!(engine.spawn_position(), Point3::new(0.0, 0.0, surface + 1.75 + 10.0));
    }

    #[test]
    fn shutdown_saves_edits() {
        let dir = tempfile::tempdir().unwrap();
        let save_path = dir.path().join("world.dat");
        let config = EngineConfig {
            worker_count: 0,
            save_path: save_path.clone(),
            ..EngineConfig::default()
        };
        let mut engine = EngineState::load(config.clone()).unwrap();
        engine.place(Point3::new(0, 0, WORLD_HEIGHT - 1), BlockType::SNOW);
        engine.shutdown().unwrap();

        let restored = EngineState::load(config).unwrap();
        assert_eq!(
            restored.edits().get(Point3::new(0, 0, WORLD_HEIGHT - 1)),
            Some(Edit::Place(BlockType::SNOW))
        );
    }
}
