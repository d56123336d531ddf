//! Asynchronous meshing pipeline: offloads chunk meshing to a thread pool
//! using snapshot-based tasks and channels for result delivery.
//!
//! Every accepted task carries a [`CancelToken`]. Cancelling a chunk (for
//! example on eviction) flips its token; workers skip cancelled tasks and
//! [`MeshingPipeline::drain_results`] drops any result whose token was
//! cancelled after the work finished, so evicted chunks never get a mesh
//! installed.
//!
//! A panic inside the mesher is caught on the worker. The worker survives,
//! the task's budget slot is released, and the result carries
//! [`MeshingError::WorkerPanicked`].

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::TrySendError;
use dashmap::DashMap;
use strata_atlas::TextureAtlas;
use strata_voxel::{BlockRegistry, ChunkCoord, ChunkSnapshot};

use crate::builder::build_snapshot_mesh;
use crate::chunk_mesh::ChunkMeshes;

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Shared cancellation flag for one meshing task.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the task as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns `true` if both handles refer to the same task.
    pub fn same_task(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// ---------------------------------------------------------------------------
// Task / result types
// ---------------------------------------------------------------------------

/// A self-contained meshing task that can run on any thread.
///
/// The snapshot owns the chunk's blocks (overlay applied) and its four
/// boundary slabs, so no locks on world data are needed during meshing.
pub struct MeshingTask {
    pub snapshot: ChunkSnapshot,
    pub token: CancelToken,
}

/// Builds the meshes for one snapshot. Runs on worker threads.
pub type Mesher = Arc<dyn Fn(&ChunkSnapshot) -> ChunkMeshes + Send + Sync>;

/// The result of a completed meshing task.
#[derive(Debug)]
pub struct MeshingResult {
    /// The chunk this mesh is for.
    pub coord: ChunkCoord,
    /// Version of the chunk data at snapshot time.
    pub version: u64,
    /// The generated opaque and translucent meshes.
    pub meshes: Result<ChunkMeshes, MeshingError>,
}

/// Why a task produced no meshes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshingError {
    #[error("mesh worker panicked: {0}")]
    WorkerPanicked(String),
}

struct Completed {
    result: MeshingResult,
    token: CancelToken,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Why [`MeshingPipeline::submit`] refused a task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("meshing queue is full")]
    QueueFull,
    #[error("chunk ({}, {}) already has a meshing task in flight", .0.x, .0.z)]
    AlreadyInFlight(ChunkCoord),
    #[error("meshing pipeline has no running workers")]
    ShutDown,
}

// ---------------------------------------------------------------------------
// MeshingPipeline
// ---------------------------------------------------------------------------

/// Number of meshing workers to use when none is configured: all cores but
/// two (one for the main loop, one for the OS), at least one.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(2).max(1)
}

/// Asynchronous meshing pipeline backed by a thread pool.
///
/// The main thread captures [`ChunkSnapshot`]s, submits them via
/// [`submit`](Self::submit), and collects [`MeshingResult`]s each tick via
/// [`drain_results`](Self::drain_results). Meshing never blocks the caller.
pub struct MeshingPipeline {
    /// Channel sender for submitting tasks to workers.
    task_sender: Option<crossbeam_channel::Sender<MeshingTask>>,
    /// Channel receiver for collecting completed results on the main thread.
    result_receiver: crossbeam_channel::Receiver<Completed>,
    /// Handles to the worker threads (for shutdown).
    worker_handles: Vec<JoinHandle<()>>,
    /// Maximum number of tasks that can be queued or running at once.
    budget: usize,
    /// Current number of queued or running tasks.
    in_flight: Arc<AtomicUsize>,
    /// Token of the live task for each chunk.
    pending: DashMap<ChunkCoord, CancelToken>,
}

impl MeshingPipeline {
    /// Creates a new meshing pipeline.
    ///
    /// `worker_count`: OS threads to spawn (0 picks [`default_worker_count`]).
    /// `budget`: maximum in-flight tasks, bounding snapshot memory.
    pub fn new(
        worker_count: usize,
        budget: usize,
        registry: Arc<BlockRegistry>,
        atlas: Arc<TextureAtlas>,
    ) -> Self {
        let mesher: Mesher = Arc::new(move |snapshot: &ChunkSnapshot| {
            build_snapshot_mesh(snapshot, &registry, &atlas)
        });
        Self::with_mesher(worker_count, budget, mesher)
    }

    /// Creates a pipeline whose workers run `mesher` on every task.
    pub fn with_mesher(worker_count: usize, budget: usize, mesher: Mesher) -> Self {
        let worker_count = if worker_count == 0 {
            default_worker_count()
        } else {
            worker_count
        };
        let budget = budget.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<MeshingTask>(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let mesher = Arc::clone(&mesher);
            let flight = Arc::clone(&in_flight);

            let spawned = std::thread::Builder::new()
                .name(format!("mesh-worker-{i}"))
                .spawn(move || {
                    while let Ok(task) = rx.recv() {
                        if !task.token.is_cancelled() {
                            let coord = task.snapshot.coord();
                            let meshes = catch_unwind(AssertUnwindSafe(|| mesher(&task.snapshot)))
                                .map_err(|payload| {
                                    let msg = panic_message(payload.as_ref());
                                    tracing::error!(
                                        "meshing chunk ({}, {}) panicked: {msg}",
                                        coord.x,
                                        coord.z
                                    );
                                    MeshingError::WorkerPanicked(msg)
                                });
                            if !task.token.is_cancelled() {
                                let _ = tx.send(Completed {
                                    result: MeshingResult {
                                        coord,
                                        version: task.snapshot.version(),
                                        meshes,
                                    },
                                    token: task.token,
                                });
                            }
                        }
                        flight.fetch_sub(1, Ordering::AcqRel);
                    }
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => tracing::error!("failed to spawn mesh worker {i}: {e}"),
            }
        }

        // Without workers nothing would ever drain the queue.
        let task_sender = if handles.is_empty() {
            tracing::warn!("no mesh workers running; meshing pipeline disabled");
            None
        } else {
            tracing::debug!("meshing pipeline: {} workers, budget {budget}", handles.len());
            Some(task_tx)
        };

        Self {
            task_sender,
            result_receiver: result_rx,
            worker_handles: handles,
            budget,
            in_flight,
            pending: DashMap::new(),
        }
    }

    /// Creates a pipeline with [`default_worker_count`] workers.
    pub fn with_defaults(
        budget: usize,
        registry: Arc<BlockRegistry>,
        atlas: Arc<TextureAtlas>,
    ) -> Self {
        Self::new(default_worker_count(), budget, registry, atlas)
    }

    /// Queues a snapshot for meshing without blocking.
    ///
    /// Returns the task's cancel token. At most one task per chunk may be
    /// in flight; cancel the old one first to replace it.
    pub fn submit(&self, snapshot: ChunkSnapshot) -> Result<CancelToken, SubmitError> {
        let sender = self.task_sender.as_ref().ok_or(SubmitError::ShutDown)?;
        let coord = snapshot.coord();
        if self.pending.contains_key(&coord) {
            return Err(SubmitError::AlreadyInFlight(coord));
        }
        if self.in_flight.load(Ordering::Acquire) >= self.budget {
            return Err(SubmitError::QueueFull);
        }

        let token = CancelToken::new();
        self.pending.insert(coord, token.clone());
        self.in_flight.fetch_add(1, Ordering::AcqRel);

        let task = MeshingTask {
            snapshot,
            token: token.clone(),
        };
        match sender.try_send(task) {
            Ok(()) => Ok(token),
            Err(e) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                self.pending.remove(&coord);
                match e {
                    TrySendError::Full(_) => Err(SubmitError::QueueFull),
                    TrySendError::Disconnected(_) => Err(SubmitError::ShutDown),
                }
            }
        }
    }

    /// Cancels the in-flight task for `coord`, if any.
    ///
    /// Its result, if one is produced, is discarded by
    /// [`drain_results`](Self::drain_results).
    pub fn cancel(&self, coord: ChunkCoord) -> bool {
        match self.pending.remove(&coord) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `coord` has a live (uncancelled) task.
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending.contains_key(&coord)
    }

    /// Number of chunks with a live task.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drains completed results, dropping those that were cancelled.
    ///
    /// Failed builds are returned too; their chunk's slot is free again.
    pub fn drain_results(&self) -> Vec<MeshingResult> {
        let mut results = Vec::new();
        while let Ok(done) = self.result_receiver.try_recv() {
            let coord = done.result.coord;
            self.pending
                .remove_if(&coord, |_, live| live.same_task(&done.token));
            if done.token.is_cancelled() {
                tracing::trace!("dropping cancelled mesh for chunk ({}, {})", coord.x, coord.z);
                continue;
            }
            results.push(done.result);
        }
        results
    }

    /// Number of tasks currently queued or being processed by workers.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of worker threads that started successfully.
    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Returns `true` while the pipeline accepts tasks.
    pub fn is_running(&self) -> bool {
        self.task_sender.is_some()
    }

    /// Cancels everything pending and joins the workers.
    pub fn shutdown(&mut self) {
        for entry in self.pending.iter() {
            entry.value().cancel();
        }
        self.pending.clear();
        // Dropping the sender closes the channel, so workers exit.
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for MeshingPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
