//! Nearest-first queue of chunk columns waiting to be generated.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;
use strata_voxel::ChunkCoord;

/// Priority queue for chunks awaiting generation, ordered by distance to the
/// viewpoint's chunk.
///
/// Uses a min-heap so that the nearest chunks are loaded first; ties break on
/// the coordinate so the order is fully deterministic.
#[derive(Debug, Default)]
pub struct ChunkLoadQueue {
    /// Min-heap: `(distance_squared, coord)`.
    queue: BinaryHeap<Reverse<(i64, ChunkCoord)>>,
    /// Coordinates currently queued (dedup guard).
    pending: FxHashSet<ChunkCoord>,
}

impl ChunkLoadQueue {
    /// Creates an empty load queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a chunk with its squared distance to the viewpoint chunk.
    ///
    /// Duplicate coordinates are silently ignored.
    pub fn enqueue(&mut self, coord: ChunkCoord, dist_sq: i64) {
        if self.pending.insert(coord) {
            self.queue.push(Reverse((dist_sq, coord)));
        }
    }

    /// Dequeues the nearest chunk. Returns `None` if the queue is empty.
    pub fn dequeue(&mut self) -> Option<(i64, ChunkCoord)> {
        while let Some(Reverse((dist_sq, coord))) = self.queue.pop() {
            if self.pending.remove(&coord) {
                return Some((dist_sq, coord));
            }
            // Removed while queued; skip it.
        }
        None
    }

    /// Drops a queued chunk. Returns `true` if it was queued.
    pub fn remove(&mut self, coord: ChunkCoord) -> bool {
        self.pending.remove(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.pending.contains(&coord)
    }

    /// Returns true if the queue contains no pending coordinates.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of pending coordinates in the queue.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Clears the queue entirely.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending.clear();
    }
}
