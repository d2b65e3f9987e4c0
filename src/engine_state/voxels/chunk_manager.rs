//! # Chunk Manager
//!
//! The chunk manager owns the lifecycle of every chunk coordinate: which ones
//! must exist around the observer, which are being generated by the worker
//! pool, which are waiting to be published, meshed or remeshed, and which have
//! left the keep-set and must go.
//!
//! ## Tick
//!
//! All work happens in [`ChunkManager::tick`], on the owning thread, in five
//! budgeted steps:
//!
//! 1. **Keep-set**: every chunk within the render distance (box radius) of the
//!    observer, clipped to the generated vertical band. Missing coordinates are
//!    submitted to the pool nearest-first.
//! 2. **Finalize**: completed generation results are drained; at most
//!    `finalize_budget` are published into the world map, have their edits
//!    re-applied and become live chunks.
//! 3. **Incremental meshing**: at most `plane_budget` plane steps. A chunk whose
//!    planes are exhausted gets an unculled mesh and is marked dirty.
//! 4. **Dirty rebuilds**: at most `dirty_budget` culled remeshes.
//! 5. **Eviction**: every coordinate outside the keep-set that is not still
//!    generating is destroyed.
//!
//! No step's cost grows with the number of chunks in flight; the budgets are
//! the only backpressure.
//!
//! ## Late Results
//!
//! A generation job cannot be cancelled. Each scheduling of a coordinate gets a
//! fresh ticket, and a result whose ticket does not match the coordinate's
//! current scheduling, or whose coordinate is no longer in the keep-set, is
//! discarded before any of its voxels reach the world map.
//!
//! ## Late Builds
//!
//! When the initial load completes, every keep-set coordinate that holds edits
//! but has no live chunk yet is built on the owning thread, plane by plane,
//! with its edits applied once the planes run out.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use cgmath::Point3;
use log::{debug, error, info, trace};
use web_time::Instant;

use crate::{
    core::StResource,
    engine_state::task_management::{task::TaskResult, TaskManager},
};

use super::{
    chunk::{Chunk, ChunkBlocks, WORLD_HEIGHT_IN_CHUNKS},
    coordinates::{chunks_touching_voxel, face_neighbours, world_to_chunk, ChunkPosition, VoxelPosition},
    edits::EditStore,
    tasks::{ChunkGenerationTask, ChunkTicket},
    terrain::TerrainGenerator,
    world::WorldBlockMap,
};

/// Lifecycle state of one chunk coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Nothing is known or scheduled for this coordinate.
    Unscheduled,
    /// A generation job has been handed to the worker pool.
    Generating,
    /// Generated blocks are waiting for the finalize budget.
    PendingFinalize,
    /// Blocks are being published into the world map.
    Finalizing,
    /// The chunk is live and waiting for its plane steps.
    IncrementalMeshing,
    /// The first, unculled mesh exists.
    MeshedUnculled,
    /// The mesh is stale and queued for a culled rebuild.
    Dirty,
    /// The mesh is up to date and culled against the neighbours.
    MeshedCulled,
}

/// Radii and per-tick budgets of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkManagerSettings {
    /// Keep-set radius in chunks.
    pub render_distance: i32,
    /// Keep-set radius while the observer is in fast mode.
    pub fast_render_distance: i32,
    /// Generation results published per tick.
    pub finalize_budget: usize,
    /// Plane steps per tick.
    pub plane_budget: usize,
    /// Plane steps per tick while the observer is in fast mode.
    pub fast_plane_budget: usize,
    /// Culled remeshes per tick.
    pub dirty_budget: usize,
    /// Remove a destroyed chunk's voxels from the world map.
    pub purge_on_destroy: bool,
}

impl Default for ChunkManagerSettings {
    fn default() -> Self {
        ChunkManagerSettings {
            render_distance: 4,
            fast_render_distance: 8,
            finalize_budget: 1,
            plane_budget: 1,
            fast_plane_budget: 10,
            dirty_budget: 6,
            purge_on_destroy: true,
        }
    }
}

/// How far the initial load has come.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    /// Generation results received plus unculled meshes built.
    pub done: usize,
    /// Twice the number of chunks the initial load waits for.
    pub total: usize,
}

impl LoadProgress {
    /// Completion in percent, clamped to `0..=100`.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.done * 100) / self.total).min(100) as u32
    }
}

/// What one call to [`ChunkManager::tick`] did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    /// Generation jobs submitted to the pool.
    pub submitted: usize,
    /// Results published into the world map.
    pub finalized: usize,
    /// Results thrown away because their coordinate moved on.
    pub discarded: usize,
    /// Plane steps performed.
    pub planes: usize,
    /// Unculled meshes built.
    pub meshed: usize,
    /// Culled remeshes performed.
    pub culled: usize,
    /// Chunk coordinates destroyed.
    pub evicted: usize,
    /// Edited chunks queued for an owning-thread build when the initial load completed.
    pub late_builds: usize,
    /// Initial load progress after this tick.
    pub progress: LoadProgress,
    /// Set only on the tick that completed the initial load.
    pub initial_load_completed: bool,
    /// Where to place the observer, filled in on the tick that completed the initial load.
    pub spawn: Option<Point3<f32>>,
}

struct BuildJob {
    position: ChunkPosition,
    apply_edits_when_done: bool,
}

struct InitialLoad {
    targets: HashSet<ChunkPosition>,
    generated: HashSet<ChunkPosition>,
    meshed: HashSet<ChunkPosition>,
    complete: bool,
}

impl InitialLoad {
    fn new(targets: HashSet<ChunkPosition>) -> Self {
        InitialLoad {
            targets,
            generated: HashSet::new(),
            meshed: HashSet::new(),
            complete: false,
        }
    }

    fn progress(&self) -> LoadProgress {
        LoadProgress {
            done: self.generated.len() + self.meshed.len(),
            total: self.targets.len() * 2,
        }
    }

    fn forget(&mut self, position: ChunkPosition) {
        if !self.meshed.contains(&position) {
            self.targets.remove(&position);
            self.generated.remove(&position);
        }
    }
}

/// Owns chunk lifecycles and the worker pool hand-off.
pub struct ChunkManager {
    settings: ChunkManagerSettings,
    terrain: Arc<TerrainGenerator>,
    world: StResource<WorldBlockMap>,
    task_manager: TaskManager<ChunkGenerationTask>,
    states: HashMap<ChunkPosition, ChunkState>,
    tickets: HashMap<ChunkPosition, u64>,
    next_ticket: u64,
    chunks: HashMap<ChunkPosition, Chunk>,
    pending_finalize: VecDeque<(ChunkTicket, ChunkBlocks)>,
    building: VecDeque<BuildJob>,
    dirty_queue: VecDeque<ChunkPosition>,
    dirty_set: HashSet<ChunkPosition>,
    keep_set: HashSet<ChunkPosition>,
    initial_load: Option<InitialLoad>,
}

impl ChunkManager {
    /// Creates a manager with no chunks.
    ///
    /// # Arguments
    /// * `settings` - Radii and budgets
    /// * `terrain` - Generator shared with the workers
    /// * `world` - World map every live chunk publishes into
    /// * `task_manager` - Worker pool running generation jobs
    pub fn new(
        settings: ChunkManagerSettings,
        terrain: Arc<TerrainGenerator>,
        world: StResource<WorldBlockMap>,
        task_manager: TaskManager<ChunkGenerationTask>,
    ) -> Self {
        ChunkManager {
            settings,
            terrain,
            world,
            task_manager,
            states: HashMap::new(),
            tickets: HashMap::new(),
            next_ticket: 0,
            chunks: HashMap::new(),
            pending_finalize: VecDeque::new(),
            building: VecDeque::new(),
            dirty_queue: VecDeque::new(),
            dirty_set: HashSet::new(),
            keep_set: HashSet::new(),
            initial_load: None,
        }
    }

    /// Runs one scheduler step for an observer at `observer`.
    ///
    /// # Arguments
    /// * `observer` - Observer eye position in world space
    /// * `fast_mode` - Use the fast render distance and plane budget
    /// * `edits` - Edits to re-apply to chunks as they materialize
    pub fn tick(&mut self, observer: Point3<f32>, fast_mode: bool, edits: &EditStore) -> TickReport {
        let tick_start = Instant::now();
        let mut report = TickReport::default();

        self.update_keep_set(observer, fast_mode, &mut report);
        self.receive_results(&mut report);
        self.finalize_chunks(edits, &mut report);
        self.build_planes(fast_mode, edits, &mut report);
        self.check_initial_load(edits, &mut report);
        self.rebuild_dirty(&mut report);
        self.evict(&mut report);

        report.progress = self.load_progress();
        trace!("Tick took {:?}: {:?}", tick_start.elapsed(), report);
        report
    }

    fn update_keep_set(&mut self, observer: Point3<f32>, fast_mode: bool, report: &mut TickReport) {
        let center = world_to_chunk(observer);
        let radius = if fast_mode {
            self.settings.fast_render_distance
        } else {
            self.settings.render_distance
        }
        .max(0);

        self.keep_set.clear();
        for dz in -radius..=radius {
            let z = center.z + dz;
            if !(0..WORLD_HEIGHT_IN_CHUNKS).contains(&z) {
                continue;
            }
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    self.keep_set.insert(Point3::new(center.x + dx, center.y + dy, z));
                }
            }
        }

        if self.initial_load.is_none() {
            self.initial_load = Some(InitialLoad::new(self.keep_set.clone()));
        }

        let mut missing: Vec<ChunkPosition> = self
            .keep_set
            .iter()
            .filter(|position| !self.states.contains_key(*position))
            .copied()
            .collect();
        missing.sort_by_key(|position| {
            let (dx, dy, dz) = (position.x - center.x, position.y - center.y, position.z - center.z);
            (dx * dx + dy * dy + dz * dz, position.x, position.y, position.z)
        });

        for position in missing {
            let ticket = ChunkTicket {
                position,
                ticket: self.next_ticket,
            };
            self.next_ticket += 1;
            self.tickets.insert(position, ticket.ticket);
            self.states.insert(position, ChunkState::Generating);
            self.task_manager
                .publish_task(ChunkGenerationTask::new(self.terrain.clone(), ticket));
            report.submitted += 1;
        }
    }

    fn is_current(&self, ticket: &ChunkTicket, expected: ChunkState) -> bool {
        self.tickets.get(&ticket.position) == Some(&ticket.ticket)
            && self.states.get(&ticket.position) == Some(&expected)
    }

    fn receive_results(&mut self, report: &mut TickReport) {
        let results = self.task_manager.process_completed_tasks();
        self.accept_results(results, report);
    }

    fn accept_results(&mut self, results: Vec<TaskResult<ChunkGenerationTask>>, report: &mut TickReport) {
        for result in results {
            let ticket = result.key;
            if !self.is_current(&ticket, ChunkState::Generating) {
                debug!("Discarding late result for chunk {:?}", ticket.position);
                report.discarded += 1;
                continue;
            }
            if !self.keep_set.contains(&ticket.position) {
                debug!("Discarding result for chunk {:?} outside the keep-set", ticket.position);
                self.unschedule(ticket.position);
                report.discarded += 1;
                continue;
            }

            match result.output {
                Ok(blocks) => {
                    self.states.insert(ticket.position, ChunkState::PendingFinalize);
                    self.pending_finalize.push_back((ticket, blocks));
                    if let Some(load) = &mut self.initial_load {
                        if load.targets.contains(&ticket.position) {
                            load.generated.insert(ticket.position);
                        }
                    }
                }
                Err(failure) => {
                    error!("Generation of chunk {:?} failed: {}", ticket.position, failure);
                    self.states.remove(&ticket.position);
                    self.tickets.remove(&ticket.position);
                }
            }
        }
    }

    // Forgets a coordinate that never became a live chunk.
    fn unschedule(&mut self, position: ChunkPosition) {
        self.states.remove(&position);
        self.tickets.remove(&position);
        if let Some(load) = &mut self.initial_load {
            load.forget(position);
        }
    }

    fn finalize_chunks(&mut self, edits: &EditStore, report: &mut TickReport) {
        while report.finalized < self.settings.finalize_budget {
            let Some((ticket, blocks)) = self.pending_finalize.pop_front() else {
                break;
            };
            if !self.is_current(&ticket, ChunkState::PendingFinalize) {
                debug!("Discarding evicted result for chunk {:?}", ticket.position);
                report.discarded += 1;
                continue;
            }
            if !self.keep_set.contains(&ticket.position) {
                debug!("Discarding result for chunk {:?} outside the keep-set", ticket.position);
                self.unschedule(ticket.position);
                report.discarded += 1;
                continue;
            }

            let position = ticket.position;
            self.states.insert(position, ChunkState::Finalizing);
            let mut chunk = Chunk::from_blocks(position, blocks, Some(self.world.clone()));
            let applied = chunk.apply_edits(edits);
            self.chunks.insert(position, chunk);

            self.states.insert(position, ChunkState::IncrementalMeshing);
            self.building.push_back(BuildJob {
                position,
                apply_edits_when_done: false,
            });
            report.finalized += 1;
            debug!("Finalized chunk {:?} ({} edits applied)", position, applied);
        }
    }

    fn build_planes(&mut self, fast_mode: bool, edits: &EditStore, report: &mut TickReport) {
        let budget = if fast_mode {
            self.settings.fast_plane_budget
        } else {
            self.settings.plane_budget
        };

        while report.planes < budget {
            let Some(job) = self.building.front() else {
                break;
            };
            let position = job.position;
            let apply_edits_when_done = job.apply_edits_when_done;

            let Some(chunk) = self.chunks.get_mut(&position) else {
                self.building.pop_front();
                continue;
            };
            let more = chunk.generate_next_plane(&self.terrain);
            report.planes += 1;
            if more {
                continue;
            }

            if apply_edits_when_done {
                chunk.apply_edits(edits);
            }
            chunk.build_mesh(false);
            self.building.pop_front();
            self.states.insert(position, ChunkState::MeshedUnculled);
            self.mark_dirty(position);
            report.meshed += 1;
            debug!("Chunk {:?} built (unculled mesh)", position);

            if let Some(load) = &mut self.initial_load {
                if load.targets.contains(&position) {
                    load.meshed.insert(position);
                }
            }
        }
    }

    fn check_initial_load(&mut self, edits: &EditStore, report: &mut TickReport) {
        let Some(load) = &mut self.initial_load else {
            return;
        };
        if load.complete || !self.building.is_empty() {
            return;
        }
        let progress = load.progress();
        if progress.done < progress.total {
            return;
        }

        load.complete = true;
        report.initial_load_completed = true;
        info!("Initial load complete ({} chunks)", load.targets.len());

        let mut late: Vec<ChunkPosition> = edits
            .chunks_with_edits()
            .into_iter()
            .filter(|position| self.keep_set.contains(position) && !self.chunks.contains_key(position))
            .collect();
        late.sort_by_key(|position| (position.x, position.y, position.z));

        for position in late {
            debug!("Building edited chunk {:?} on the owning thread", position);
            // A fresh ticket makes any in-flight worker result stale.
            self.tickets.insert(position, self.next_ticket);
            self.next_ticket += 1;
            self.chunks
                .insert(position, Chunk::new(position, Some(self.world.clone())));
            self.states.insert(position, ChunkState::IncrementalMeshing);
            self.building.push_back(BuildJob {
                position,
                apply_edits_when_done: true,
            });
            report.late_builds += 1;
        }
    }

    fn rebuild_dirty(&mut self, report: &mut TickReport) {
        let mut processed = 0;
        while processed < self.settings.dirty_budget {
            let Some(position) = self.dirty_queue.pop_front() else {
                break;
            };
            self.dirty_set.remove(&position);
            processed += 1;

            if self.state_of(position) == ChunkState::IncrementalMeshing {
                continue;
            }
            if let Some(chunk) = self.chunks.get_mut(&position) {
                chunk.build_mesh(true);
                self.states.insert(position, ChunkState::MeshedCulled);
                report.culled += 1;
                debug!("Chunk {:?} remeshed (culled)", position);
            }
        }
    }

    fn evict(&mut self, report: &mut TickReport) {
        let leaving: Vec<ChunkPosition> = self
            .states
            .iter()
            .filter(|(position, state)| {
                **state != ChunkState::Generating && !self.keep_set.contains(*position)
            })
            .map(|(position, _)| *position)
            .collect();
        if leaving.is_empty() {
            return;
        }

        let purge = self.settings.purge_on_destroy;
        for position in &leaving {
            self.states.remove(position);
            self.tickets.remove(position);
            if let Some(load) = &mut self.initial_load {
                load.forget(*position);
            }
            if let Some(chunk) = self.chunks.remove(position) {
                let purged = chunk.destroy(purge);
                debug!("Evicted chunk {:?} ({} voxels purged)", position, purged);
            }
        }

        let leaving: HashSet<ChunkPosition> = leaving.into_iter().collect();
        self.building
            .retain(|job| !leaving.contains(&job.position));

        if purge {
            for position in &leaving {
                for neighbour in face_neighbours(*position) {
                    if self.chunks.contains_key(&neighbour) {
                        self.mark_dirty(neighbour);
                    }
                }
            }
        }
        report.evicted += leaving.len();
    }

    /// Queues a culled rebuild of `position`.
    ///
    /// # Returns
    /// `false` if the chunk was already queued.
    pub fn mark_dirty(&mut self, position: ChunkPosition) -> bool {
        if !self.dirty_set.insert(position) {
            return false;
        }
        self.dirty_queue.push_back(position);
        if let Some(state) = self.states.get_mut(&position) {
            if matches!(state, ChunkState::MeshedUnculled | ChunkState::MeshedCulled) {
                *state = ChunkState::Dirty;
            }
        }
        true
    }

    /// Marks every resident chunk that can see `voxel` as dirty.
    pub fn mark_voxel_changed(&mut self, voxel: VoxelPosition) {
        for position in chunks_touching_voxel(voxel) {
            if self.chunks.contains_key(&position) {
                self.mark_dirty(position);
            }
        }
    }

    /// Lifecycle state of a chunk coordinate.
    pub fn state_of(&self, position: ChunkPosition) -> ChunkState {
        self.states
            .get(&position)
            .copied()
            .unwrap_or(ChunkState::Unscheduled)
    }

    /// The live chunk at `position`, if resident.
    pub fn chunk(&self, position: ChunkPosition) -> Option<&Chunk> {
        self.chunks.get(&position)
    }

    /// Mutable access to the live chunk at `position`, if resident.
    pub fn chunk_mut(&mut self, position: ChunkPosition) -> Option<&mut Chunk> {
        self.chunks.get_mut(&position)
    }

    /// Iterates every live chunk.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Number of live chunks.
    pub fn resident_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunks queued for a culled rebuild.
    pub fn dirty_len(&self) -> usize {
        self.dirty_queue.len()
    }

    /// Chunks waiting for their plane steps.
    pub fn building_len(&self) -> usize {
        self.building.len()
    }

    /// Generation results waiting for the finalize budget.
    pub fn pending_finalize_len(&self) -> usize {
        self.pending_finalize.len()
    }

    /// Coordinates required by the last tick.
    pub fn keep_set(&self) -> &HashSet<ChunkPosition> {
        &self.keep_set
    }

    /// Initial load progress; empty before the first tick.
    pub fn load_progress(&self) -> LoadProgress {
        self.initial_load
            .as_ref()
            .map(InitialLoad::progress)
            .unwrap_or_default()
    }

    /// Whether the initial load has completed.
    pub fn is_initial_load_complete(&self) -> bool {
        self.initial_load.as_ref().is_some_and(|load| load.complete)
    }

    /// The settings this manager runs with.
    pub fn settings(&self) -> &ChunkManagerSettings {
        &self.settings
    }

    /// The world map live chunks publish into.
    pub fn world(&self) -> &StResource<WorldBlockMap> {
        &self.world
    }

    /// Stops the worker pool without waiting for running jobs.
    pub fn shutdown(&mut self) {
        self.task_manager.shutdown();
    }

    #[cfg(test)]
    pub(crate) fn insert_resident(&mut self, chunk: Chunk, state: ChunkState) {
        self.states.insert(chunk.position(), state);
        self.chunks.insert(chunk.position(), chunk);
    }
}
