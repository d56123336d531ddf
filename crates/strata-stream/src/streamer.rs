//! Chunk streaming around a moving viewpoint.
//!
//! Each [`ChunkStreamer::tick`]:
//!
//! 1. Recomputes the target disc when the viewpoint enters a new chunk.
//! 2. Generates up to `loads_per_tick` missing chunks, nearest first.
//! 3. Evicts chunks beyond `render_distance + eviction_margin`, cancelling
//!    their meshing jobs and releasing their meshes.
//! 4. Installs finished meshes for chunks that are still resident.
//! 5. Submits a snapshot for every resident chunk whose version moved past
//!    its mesh, unless a job for it is already in flight.
//!
//! Edits landing while a job is in flight bump the chunk version again; the
//! finished mesh is installed and the chunk stays stale, so the next tick
//! submits one follow-up job no matter how many edits arrived.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use strata_atlas::TextureAtlas;
use strata_config::StreamingConfig;
use strata_mesh::{ChunkMeshState, ChunkMeshes, MeshingPipeline, SubmitError, build_snapshot_mesh};
use strata_voxel::{BlockRegistry, ChunkCoord, ChunkStore};

use crate::generator::TerrainGenerator;
use crate::load_queue::ChunkLoadQueue;
use crate::mesh_store::MeshStore;

// ---------------------------------------------------------------------------
// Configuration / reporting
// ---------------------------------------------------------------------------

/// Radii and budgets for the streamer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Chunks within this Euclidean radius (in chunks) are loaded.
    pub render_distance: u32,
    /// Resident chunks are kept until they are farther than
    /// `render_distance + eviction_margin`.
    pub eviction_margin: u32,
    /// Maximum chunk generations per tick.
    pub loads_per_tick: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            render_distance: 4,
            eviction_margin: 2,
            loads_per_tick: 8,
        }
    }
}

impl From<&StreamingConfig> for StreamConfig {
    fn from(config: &StreamingConfig) -> Self {
        Self {
            render_distance: config.render_distance,
            eviction_margin: config.eviction_margin,
            loads_per_tick: config.loads_per_tick,
        }
    }
}

/// Lifecycle of a chunk coordinate as seen by the streamer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Not resident and not queued.
    Absent,
    /// Queued for generation.
    Loading,
    /// Resident; its mesh (if any) is the latest one submitted.
    Resident,
    /// Resident with a meshing job in flight.
    Remeshing,
}

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamTickResult {
    /// Chunks generated and installed.
    pub loaded: u32,
    /// Chunks removed from the store.
    pub evicted: u32,
    /// Meshing jobs handed to the workers.
    pub submitted: u32,
    /// Meshes swapped in.
    pub installed: u32,
    /// Finished meshes dropped because their chunk is gone.
    pub discarded: u32,
}

// ---------------------------------------------------------------------------
// ChunkStreamer
// ---------------------------------------------------------------------------

/// Keeps the chunks around a viewpoint resident and meshed.
pub struct ChunkStreamer {
    config: StreamConfig,
    generator: Box<dyn TerrainGenerator>,
    registry: Arc<BlockRegistry>,
    atlas: Arc<TextureAtlas>,
    pipeline: MeshingPipeline,
    load_queue: ChunkLoadQueue,
    /// Coordinates inside the render disc of `center`.
    targets: FxHashSet<ChunkCoord>,
    /// Chunk the targets were computed for.
    center: Option<ChunkCoord>,
    /// Mesh bookkeeping for every chunk this streamer installed.
    states: FxHashMap<ChunkCoord, ChunkMeshState>,
    meshes: MeshStore,
}

impl ChunkStreamer {
    pub fn new(
        config: StreamConfig,
        generator: impl TerrainGenerator + 'static,
        registry: Arc<BlockRegistry>,
        atlas: Arc<TextureAtlas>,
        pipeline: MeshingPipeline,
    ) -> Self {
        Self {
            config,
            generator: Box::new(generator),
            registry,
            atlas,
            pipeline,
            load_queue: ChunkLoadQueue::new(),
            targets: FxHashSet::default(),
            center: None,
            states: FxHashMap::default(),
            meshes: MeshStore::new(),
        }
    }

    /// Builds a streamer and its meshing pool from the streaming config.
    pub fn from_config(
        config: &StreamingConfig,
        generator: impl TerrainGenerator + 'static,
        registry: Arc<BlockRegistry>,
        atlas: Arc<TextureAtlas>,
    ) -> Self {
        let pipeline = MeshingPipeline::new(
            config.mesh_workers as usize,
            config.mesh_queue_capacity as usize,
            Arc::clone(&registry),
            Arc::clone(&atlas),
        );
        Self::new(config.into(), generator, registry, atlas, pipeline)
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Runs one streaming step for a viewpoint at world position `viewpoint`.
    pub fn tick(&mut self, store: &mut ChunkStore, viewpoint: Vec3) -> StreamTickResult {
        let mut result = StreamTickResult::default();
        let center = store.dims().chunk_at_position(viewpoint);

        if self.center != Some(center) {
            self.retarget(store, center);
        }
        result.loaded = self.load_budgeted(store);
        result.evicted = self.evict_distant(store, center);
        let (installed, discarded) = self.install_results(store);
        result.installed = installed;
        result.discarded = discarded;
        result.submitted = self.submit_stale(store, center);

        if result != StreamTickResult::default() {
            tracing::debug!(
                "stream tick at ({}, {}): {:?}, {} triangles",
                center.x,
                center.z,
                result,
                self.meshes.total_triangles()
            );
        }
        result
    }

    fn retarget(&mut self, store: &ChunkStore, center: ChunkCoord) {
        let r = self.config.render_distance as i32;
        let r_sq = (r as i64) * (r as i64);

        self.targets.clear();
        self.load_queue.clear();
        for dx in -r..=r {
            for dz in -r..=r {
                let coord = center.offset(dx, dz);
                let dist_sq = center.distance_sq(coord);
                if dist_sq > r_sq {
                    continue;
                }
                self.targets.insert(coord);
                if !store.contains(coord) {
                    self.load_queue.enqueue(coord, dist_sq);
                }
            }
        }
        self.center = Some(center);
        tracing::debug!(
            "retargeted around ({}, {}): {} targets, {} to load",
            center.x,
            center.z,
            self.targets.len(),
            self.load_queue.len()
        );
    }

    fn load_budgeted(&mut self, store: &mut ChunkStore) -> u32 {
        let mut loaded = 0;
        while loaded < self.config.loads_per_tick {
            let Some((_, coord)) = self.load_queue.dequeue() else {
                break;
            };
            if store.contains(coord) || !self.targets.contains(&coord) {
                continue;
            }
            let grid = self.generator.generate(coord, store.dims());
            if let Err(e) = store.set(coord, grid) {
                tracing::warn!("generated chunk ({}, {}) rejected: {e}", coord.x, coord.z);
                continue;
            }
            self.states.insert(coord, ChunkMeshState::new());
            loaded += 1;
        }
        loaded
    }

    fn evict_distant(&mut self, store: &mut ChunkStore, center: ChunkCoord) -> u32 {
        let keep = (self.config.render_distance + self.config.eviction_margin) as i64;
        let keep_sq = keep * keep;
        let distant: Vec<ChunkCoord> = store
            .coords()
            .filter(|coord| center.distance_sq(*coord) > keep_sq)
            .collect();

        for &coord in &distant {
            self.evict(store, coord);
        }
        distant.len() as u32
    }

    /// Removes a chunk and everything the streamer holds for it.
    ///
    /// Returns `true` if the chunk was resident.
    pub fn evict(&mut self, store: &mut ChunkStore, coord: ChunkCoord) -> bool {
        self.pipeline.cancel(coord);
        self.meshes.remove(coord);
        self.states.remove(&coord);
        self.load_queue.remove(coord);
        store.remove(coord).is_some()
    }

    fn install_results(&mut self, store: &ChunkStore) -> (u32, u32) {
        let (mut installed, mut discarded) = (0, 0);
        for done in self.pipeline.drain_results() {
            match self.states.get_mut(&done.coord) {
                Some(state) if store.contains(done.coord) => {
                    // A failed build keeps the previous mesh until the next change.
                    state.mark_meshed(done.version);
                    match done.meshes {
                        Ok(meshes) => {
                            self.meshes.install(done.coord, done.version, meshes);
                            installed += 1;
                        }
                        Err(e) => tracing::error!(
                            "chunk ({}, {}) keeps its previous mesh: {e}",
                            done.coord.x,
                            done.coord.z
                        ),
                    }
                }
                _ => {
                    tracing::debug!(
                        "discarding mesh for non-resident chunk ({}, {})",
                        done.coord.x,
                        done.coord.z
                    );
                    discarded += 1;
                }
            }
        }
        (installed, discarded)
    }

    fn submit_stale(&mut self, store: &ChunkStore, center: ChunkCoord) -> u32 {
        let mut stale: Vec<(i64, ChunkCoord, u64)> = store
            .coords()
            .filter_map(|coord| {
                let version = store.version(coord)?;
                let state = self.states.entry(coord).or_default();
                state
                    .needs_remesh(version)
                    .then(|| (center.distance_sq(coord), coord, version))
            })
            .collect();
        stale.sort_unstable();

        let mut submitted = 0;
        for (_, coord, version) in stale {
            let Some(snapshot) = store.snapshot(coord) else {
                continue;
            };
            match self.pipeline.submit(snapshot) {
                Ok(_) => {
                    self.mark_submitted(coord);
                    submitted += 1;
                }
                Err(SubmitError::QueueFull) => break,
                Err(SubmitError::AlreadyInFlight(_)) => self.mark_submitted(coord),
                Err(SubmitError::ShutDown) => {
                    // No workers: mesh on this thread.
                    let Some(snapshot) = store.snapshot(coord) else {
                        continue;
                    };
                    let meshes = build_snapshot_mesh(&snapshot, &self.registry, &self.atlas);
                    if let Some(state) = self.states.get_mut(&coord) {
                        state.mark_meshed(version);
                    }
                    self.meshes.install(coord, version, meshes);
                }
            }
        }
        submitted
    }

    fn mark_submitted(&mut self, coord: ChunkCoord) {
        if let Some(state) = self.states.get_mut(&coord) {
            state.mark_submitted();
        }
    }

    /// Returns `true` when nothing is queued, nothing is in flight, and every
    /// resident chunk's mesh matches its current version.
    pub fn is_settled(&self, store: &ChunkStore) -> bool {
        self.load_queue.is_empty()
            && self.pipeline.pending_count() == 0
            && store.coords().all(|coord| {
                match (store.version(coord), self.states.get(&coord)) {
                    (Some(version), Some(state)) => !state.is_stale(version),
                    _ => false,
                }
            })
    }

    /// Ticks until [`is_settled`](Self::is_settled) or `timeout` elapses.
    pub fn settle(&mut self, store: &mut ChunkStore, viewpoint: Vec3, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            self.tick(store, viewpoint);
            if self.is_settled(store) {
                return true;
            }
            if start.elapsed() >= timeout {
                tracing::warn!("streamer did not settle within {timeout:?}");
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Where `coord` is in its lifecycle.
    pub fn chunk_state(&self, store: &ChunkStore, coord: ChunkCoord) -> ChunkState {
        if store.contains(coord) {
            match self.states.get(&coord) {
                Some(state) if state.remesh_pending => ChunkState::Remeshing,
                _ => ChunkState::Resident,
            }
        } else if self.load_queue.contains(coord) {
            ChunkState::Loading
        } else {
            ChunkState::Absent
        }
    }

    /// Current meshes of a chunk.
    pub fn mesh(&self, coord: ChunkCoord) -> Option<Arc<ChunkMeshes>> {
        self.meshes.get(coord)
    }

    pub fn meshes(&self) -> &MeshStore {
        &self.meshes
    }

    /// Triangles across every installed chunk mesh.
    pub fn total_triangles(&self) -> usize {
        self.meshes.total_triangles()
    }

    /// Chunk the target disc is centred on.
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    /// Coordinates inside the current render disc.
    pub fn targets(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.targets.iter().copied()
    }

    /// Chunks still waiting to be generated.
    pub fn queued_loads(&self) -> usize {
        self.load_queue.len()
    }

    /// Stops the meshing workers. Later ticks mesh on the calling thread.
    pub fn shutdown(&mut self) {
        self.pipeline.shutdown();
    }
}
