//! Owned, self-contained chunk views for off-thread meshing.
//!
//! A [`ChunkSnapshot`] holds the chunk's cells with the overlay already
//! applied, plus the single column-slab of each horizontal neighbour that
//! touches the chunk. Worker threads read it without ever touching the
//! [`ChunkStore`].

use crate::chunk::ChunkGrid;
use crate::coords::{ChunkCoord, ChunkDims};
use crate::face::FaceDirection;
use crate::registry::BlockId;
use crate::store::ChunkStore;

// ---------------------------------------------------------------------------
// Boundary slab
// ---------------------------------------------------------------------------

/// A `size × height` layer of blocks just outside one side of a chunk.
///
/// Stored row-major with the horizontal coordinate varying fastest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundarySlab {
    data: Vec<BlockId>,
    size: usize,
}

impl BoundarySlab {
    /// Block at horizontal offset `u` and height `y`.
    pub fn get(&self, u: usize, y: usize) -> BlockId {
        self.data
            .get(y * self.size + u)
            .copied()
            .unwrap_or(BlockId::AIR)
    }

    /// Number of cells in the slab.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the slab holds no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Which slab to read for a side: `HORIZONTAL` order is +X, −X, +Z, −Z.
fn slab_slot(face: FaceDirection) -> Option<usize> {
    FaceDirection::HORIZONTAL.iter().position(|&f| f == face)
}

// ---------------------------------------------------------------------------
// ChunkSnapshot
// ---------------------------------------------------------------------------

/// Chunk cells plus neighbour boundaries, detached from the store.
#[derive(Clone, Debug)]
pub struct ChunkSnapshot {
    coord: ChunkCoord,
    version: u64,
    grid: ChunkGrid,
    /// Slabs in `FaceDirection::HORIZONTAL` order.
    borders: [BoundarySlab; 4],
}

impl ChunkSnapshot {
    /// Captures the chunk at `coord`, or `None` if it is not resident.
    pub fn capture(store: &ChunkStore, coord: ChunkCoord) -> Option<Self> {
        let grid = store.get(coord)?;
        let version = store.version(coord)?;
        let dims = store.dims();
        let (ox, oz) = dims.origin(coord);

        let mut grid = ChunkGrid::clone(grid);
        if let Some(bucket) = store.overlay_bucket(coord) {
            for (pos, &block) in bucket {
                let (lx, lz) = dims.local_of(pos.x, pos.z);
                grid.set(lx, pos.y as usize, lz, block);
            }
        }

        let borders = FaceDirection::HORIZONTAL.map(|face| {
            let mut data = Vec::with_capacity(dims.size * dims.height);
            for y in 0..dims.height as i32 {
                for u in 0..dims.size as i32 {
                    let (wx, wz) = match face {
                        FaceDirection::PosX => (ox + dims.size as i32, oz + u),
                        FaceDirection::NegX => (ox - 1, oz + u),
                        FaceDirection::PosZ => (ox + u, oz + dims.size as i32),
                        _ => (ox + u, oz - 1),
                    };
                    data.push(store.block_at(wx, y, wz));
                }
            }
            BoundarySlab {
                data,
                size: dims.size,
            }
        });

        Some(Self {
            coord,
            version,
            grid,
            borders,
        })
    }

    /// Builds a snapshot from a bare grid with air on every side.
    pub fn isolated(coord: ChunkCoord, version: u64, grid: ChunkGrid) -> Self {
        let dims = grid.dims();
        let air = BoundarySlab {
            data: vec![BlockId::AIR; dims.size * dims.height],
            size: dims.size,
        };
        Self {
            coord,
            version,
            grid,
            borders: [air.clone(), air.clone(), air.clone(), air],
        }
    }

    /// Coordinate of the captured chunk.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Store version at capture time.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The chunk's cells with overlay edits applied.
    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    /// Chunk dimensions.
    pub fn dims(&self) -> ChunkDims {
        self.grid.dims()
    }

    /// World block coordinates of the chunk's local origin column.
    pub fn origin(&self) -> (i32, i32) {
        self.dims().origin(self.coord)
    }

    /// Boundary slab on the given horizontal side.
    pub fn border(&self, face: FaceDirection) -> Option<&BoundarySlab> {
        slab_slot(face).map(|slot| &self.borders[slot])
    }

    /// Block at a world position as seen from this chunk.
    ///
    /// Resolves cells inside the chunk and in the four boundary slabs;
    /// anything else (diagonals, out of vertical range) reads as air.
    pub fn border_block(&self, wx: i32, wy: i32, wz: i32) -> BlockId {
        let dims = self.dims();
        if !dims.contains_y(wy) {
            return BlockId::AIR;
        }
        let (ox, oz) = self.origin();
        let (lx, lz) = (wx - ox, wz - oz);
        let size = dims.size as i32;
        let y = wy as usize;
        let inside = |v: i32| (0..size).contains(&v);

        match (inside(lx), inside(lz)) {
            (true, true) => self.grid.get(lx as usize, y, lz as usize),
            (false, true) if lx == size => self.borders[0].get(lz as usize, y),
            (false, true) if lx == -1 => self.borders[1].get(lz as usize, y),
            (true, false) if lz == size => self.borders[2].get(lx as usize, y),
            (true, false) if lz == -1 => self.borders[3].get(lx as usize, y),
            _ => BlockId::AIR,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const STONE: BlockId = BlockId(1);
    const GLASS: BlockId = BlockId(2);

    fn dims() -> ChunkDims {
        ChunkDims::new(4, 4)
    }

    #[test]
    fn test_capture_missing_chunk_is_none() {
        let store = ChunkStore::new(dims());
        assert!(store.snapshot(ChunkCoord::new(0, 0)).is_none());
    }

    #[test]
    fn test_capture_applies_overlay() {
        let mut store = ChunkStore::new(dims());
        let coord = ChunkCoord::new(1, 0);
        store
            .set(coord, ChunkGrid::new_filled(dims(), STONE))
            .unwrap();
        store.set_overlay(5, 2, 1, BlockId::AIR);

        let snap = store.snapshot(coord).unwrap();
        assert_eq!(snap.grid().get(1, 2, 1), BlockId::AIR);
        assert_eq!(snap.grid().get(0, 2, 1), STONE);
        assert_eq!(snap.version(), store.version(coord).unwrap());
        // The installed grid itself is untouched.
        assert_eq!(store.get(coord).unwrap().get(1, 2, 1), STONE);
    }

    #[test]
    fn test_border_slabs_read_neighbors_and_overlay() {
        let mut store = ChunkStore::new(dims());
        let center = ChunkCoord::new(0, 0);
        store.set(center, ChunkGrid::new_air(dims())).unwrap();
        store
            .set(ChunkCoord::new(1, 0), ChunkGrid::new_filled(dims(), STONE))
            .unwrap();
        // Edit in the −Z neighbour, which is not resident.
        store.set_overlay(2, 3, -1, GLASS);

        let snap = store.snapshot(center).unwrap();
        assert_eq!(snap.border_block(4, 0, 2), STONE);
        assert_eq!(snap.border_block(-1, 0, 2), BlockId::AIR);
        assert_eq!(snap.border_block(2, 3, -1), GLASS);
        assert_eq!(snap.border(FaceDirection::PosX).unwrap().len(), 16);
        assert!(snap.border(FaceDirection::PosY).is_none());
    }

    #[test]
    fn test_border_block_outside_slabs_is_air() {
        let snap = ChunkSnapshot::isolated(
            ChunkCoord::new(0, 0),
            1,
            ChunkGrid::new_filled(dims(), STONE),
        );
        assert_eq!(snap.border_block(1, 1, 1), STONE);
        assert_eq!(snap.border_block(4, 1, 4), BlockId::AIR);
        assert_eq!(snap.border_block(1, 4, 1), BlockId::AIR);
        assert_eq!(snap.border_block(1, -1, 1), BlockId::AIR);
        assert_eq!(snap.border_block(9, 1, 1), BlockId::AIR);
    }
}
