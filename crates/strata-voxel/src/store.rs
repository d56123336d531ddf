//! Resident chunk set plus the world-absolute block-modification overlay.
//!
//! The [`ChunkStore`] is the single owner of world state. Installed grids are
//! immutable and shared as `Arc<ChunkGrid>`; every edit lands in the overlay,
//! which is keyed by absolute world block position and therefore survives
//! eviction and regeneration of the chunk underneath it.
//!
//! Versions come from one store-wide counter. A chunk that is evicted and
//! later reinstalled gets a version it has never had before, so a mesh built
//! for an older incarnation can never be mistaken for a current one.

use std::sync::Arc;

use glam::IVec3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::chunk::{ChunkError, ChunkGrid};
use crate::coords::{ChunkCoord, ChunkDims};
use crate::registry::BlockId;
use crate::snapshot::ChunkSnapshot;

/// One overlay edit in a serde-friendly form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayEntry {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub block: BlockId,
}

#[derive(Clone, Debug)]
struct ResidentChunk {
    grid: Arc<ChunkGrid>,
    version: u64,
}

/// Owns all resident chunks and the edit overlay.
pub struct ChunkStore {
    dims: ChunkDims,
    chunks: FxHashMap<ChunkCoord, ResidentChunk>,
    /// Overlay edits bucketed by owning chunk so snapshots touch one bucket.
    overlay: FxHashMap<ChunkCoord, FxHashMap<IVec3, BlockId>>,
    next_version: u64,
}

impl ChunkStore {
    /// Creates an empty store for chunks of the given dimensions.
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            chunks: FxHashMap::default(),
            overlay: FxHashMap::default(),
            next_version: 1,
        }
    }

    /// Chunk dimensions shared by every grid in this store.
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    // -----------------------------------------------------------------------
    // Chunk residency
    // -----------------------------------------------------------------------

    /// Returns the resident grid at `coord`, if any.
    pub fn get(&self, coord: ChunkCoord) -> Option<&Arc<ChunkGrid>> {
        self.chunks.get(&coord).map(|chunk| &chunk.grid)
    }

    /// Installs or replaces the grid at `coord` and returns its fresh version.
    ///
    /// Resident horizontal neighbours are bumped too: their border faces were
    /// built while this chunk was absent and read as air.
    pub fn set(&mut self, coord: ChunkCoord, grid: ChunkGrid) -> Result<u64, ChunkError> {
        if grid.dims() != self.dims {
            return Err(ChunkError::DimensionMismatch {
                expected: self.dims,
                actual: grid.dims(),
            });
        }
        let version = self.stamp();
        self.chunks.insert(
            coord,
            ResidentChunk {
                grid: Arc::new(grid),
                version,
            },
        );
        for neighbor in coord.neighbors() {
            self.touch(neighbor);
        }
        tracing::debug!("installed chunk ({}, {}) at version {}", coord.x, coord.z, version);
        Ok(version)
    }

    /// Evicts the chunk at `coord`. The overlay is left untouched; any mesh
    /// built for the chunk must be released by the caller.
    ///
    /// Resident horizontal neighbours are bumped: their border faces were
    /// culled against this chunk and now face air.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Arc<ChunkGrid>> {
        let removed = self.chunks.remove(&coord)?;
        for neighbor in coord.neighbors() {
            self.touch(neighbor);
        }
        tracing::debug!("removed chunk ({}, {})", coord.x, coord.z);
        Some(removed.grid)
    }

    /// Marks a resident chunk as changed. Returns `false` if it is not resident.
    pub fn touch(&mut self, coord: ChunkCoord) -> bool {
        if !self.chunks.contains_key(&coord) {
            return false;
        }
        let version = self.stamp();
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.version = version;
        }
        true
    }

    /// Current version of a resident chunk.
    pub fn version(&self, coord: ChunkCoord) -> Option<u64> {
        self.chunks.get(&coord).map(|chunk| chunk.version)
    }

    /// Returns `true` if a chunk is resident at `coord`.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if no chunk is resident.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterates over resident chunk coordinates.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    fn stamp(&mut self) -> u64 {
        let version = self.next_version;
        self.next_version += 1;
        version
    }

    // -----------------------------------------------------------------------
    // Overlay
    // -----------------------------------------------------------------------

    /// Records an edit at a world block position, overriding the grid.
    ///
    /// Positions outside the vertical range are ignored with a warning. The
    /// owning chunk, and any neighbour sharing the border the block sits on,
    /// get a version bump.
    pub fn set_overlay(&mut self, x: i32, y: i32, z: i32, block: BlockId) {
        if !self.dims.contains_y(y) {
            tracing::warn!("overlay write outside vertical range: ({}, {}, {})", x, y, z);
            return;
        }
        let pos = IVec3::new(x, y, z);
        let owner = self.dims.chunk_of(x, z);
        self.overlay.entry(owner).or_default().insert(pos, block);
        for coord in self.dims.chunks_touching(pos) {
            self.touch(coord);
        }
    }

    /// Returns the overlay value at a world block position, if one was set.
    pub fn get_overlay(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        let owner = self.dims.chunk_of(x, z);
        self.overlay
            .get(&owner)
            .and_then(|bucket| bucket.get(&IVec3::new(x, y, z)))
            .copied()
    }

    /// Total number of overlay edits.
    pub fn overlay_len(&self) -> usize {
        self.overlay.values().map(|bucket| bucket.len()).sum()
    }

    /// Overlay edits owned by `coord`, keyed by world position.
    pub(crate) fn overlay_bucket(&self, coord: ChunkCoord) -> Option<&FxHashMap<IVec3, BlockId>> {
        self.overlay.get(&coord)
    }

    /// Exports every overlay edit, sorted by position for stable output.
    pub fn overlay_snapshot(&self) -> Vec<OverlayEntry> {
        let mut entries: Vec<OverlayEntry> = self
            .overlay
            .values()
            .flat_map(|bucket| bucket.iter())
            .map(|(pos, &block)| OverlayEntry {
                x: pos.x,
                y: pos.y,
                z: pos.z,
                block,
            })
            .collect();
        entries.sort_by_key(|e| (e.x, e.y, e.z));
        entries
    }

    /// Replaces the overlay with `entries` and bumps every affected chunk.
    pub fn restore_overlay(&mut self, entries: impl IntoIterator<Item = OverlayEntry>) {
        let previous = std::mem::take(&mut self.overlay);
        for coord in previous.keys() {
            self.touch(*coord);
        }
        for entry in entries {
            self.set_overlay(entry.x, entry.y, entry.z, entry.block);
        }
    }

    // -----------------------------------------------------------------------
    // World queries
    // -----------------------------------------------------------------------

    /// Block at a world position: overlay first, then the owning chunk.
    ///
    /// Out-of-range heights and missing chunks read as air.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        if !self.dims.contains_y(y) {
            return BlockId::AIR;
        }
        if let Some(block) = self.get_overlay(x, y, z) {
            return block;
        }
        let coord = self.dims.chunk_of(x, z);
        let Some(chunk) = self.chunks.get(&coord) else {
            return BlockId::AIR;
        };
        let (lx, lz) = self.dims.local_of(x, z);
        chunk.grid.get(lx, y as usize, lz)
    }

    /// [`block_at`](Self::block_at) for a vector position.
    pub fn block_at_pos(&self, pos: IVec3) -> BlockId {
        self.block_at(pos.x, pos.y, pos.z)
    }

    /// Height of the highest non-air block in a column, or `None` if the
    /// column is empty or not resident.
    pub fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        (0..self.dims.height as i32)
            .rev()
            .find(|&y| !self.block_at(x, y, z).is_air())
    }

    /// Captures an owned, self-contained view of a resident chunk for meshing.
    pub fn snapshot(&self, coord: ChunkCoord) -> Option<ChunkSnapshot> {
        ChunkSnapshot::capture(self, coord)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
