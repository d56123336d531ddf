//! Dense chunk grid: one [`BlockId`] per cell of a `size × height × size` column.
//!
//! A [`ChunkGrid`] is what the terrain generator produces and what the
//! [`ChunkStore`](crate::store::ChunkStore) installs. Once installed it is
//! shared as `Arc<ChunkGrid>` and never mutated; edits go to the store's
//! overlay instead.

use thiserror::Error;

use crate::coords::ChunkDims;
use crate::registry::BlockId;

/// Errors raised when constructing a chunk grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    /// The supplied cell array does not match `size * size * height`.
    #[error("chunk grid has {actual} cells, expected {expected}")]
    LengthMismatch {
        /// Cells required by the dimensions.
        expected: usize,
        /// Cells supplied.
        actual: usize,
    },
    /// The grid's dimensions differ from the store's.
    #[error("chunk dimensions {actual:?} do not match store dimensions {expected:?}")]
    DimensionMismatch {
        /// Dimensions of the store.
        expected: ChunkDims,
        /// Dimensions of the rejected grid.
        actual: ChunkDims,
    },
}

/// Dense block array for one chunk column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkGrid {
    dims: ChunkDims,
    blocks: Vec<BlockId>,
}

impl ChunkGrid {
    /// Creates a grid with every cell set to `fill`.
    pub fn new_filled(dims: ChunkDims, fill: BlockId) -> Self {
        Self {
            dims,
            blocks: vec![fill; dims.volume()],
        }
    }

    /// Creates an all-air grid.
    pub fn new_air(dims: ChunkDims) -> Self {
        Self::new_filled(dims, BlockId::AIR)
    }

    /// Wraps an existing cell array laid out as `y * size * size + z * size + x`.
    pub fn from_blocks(dims: ChunkDims, blocks: Vec<BlockId>) -> Result<Self, ChunkError> {
        if blocks.len() != dims.volume() {
            return Err(ChunkError::LengthMismatch {
                expected: dims.volume(),
                actual: blocks.len(),
            });
        }
        Ok(Self { dims, blocks })
    }

    /// Dimensions of this grid.
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Returns the block at a local cell; air (with a warning) if out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        if !self.dims.contains(x, y, z) {
            tracing::warn!("ChunkGrid::get out of bounds: ({}, {}, {})", x, y, z);
            return BlockId::AIR;
        }
        self.blocks[self.dims.index(x, y, z)]
    }

    /// Returns the block at a local cell given as signed coordinates, or
    /// `None` when the cell lies outside the grid.
    pub fn get_signed(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        self.dims
            .contains(x, y, z)
            .then(|| self.blocks[self.dims.index(x, y, z)])
    }

    /// Sets a local cell. No-op with a warning if out of bounds.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockId) {
        if !self.dims.contains(x, y, z) {
            tracing::warn!("ChunkGrid::set out of bounds: ({}, {}, {})", x, y, z);
            return;
        }
        let index = self.dims.index(x, y, z);
        self.blocks[index] = block;
    }

    /// Raw cell slice in storage order.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Returns `true` if every cell is air.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.is_air())
    }

    /// Number of non-air cells.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STONE: BlockId = BlockId(1);

    #[test]
    fn test_new_air_is_empty() {
        let grid = ChunkGrid::new_air(ChunkDims::new(4, 4));
        assert!(grid.is_empty());
        assert_eq!(grid.blocks().len(), 64);
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut grid = ChunkGrid::new_air(ChunkDims::new(4, 8));
        grid.set(1, 7, 3, STONE);
        assert_eq!(grid.get(1, 7, 3), STONE);
        assert_eq!(grid.get(1, 6, 3), BlockId::AIR);
        assert_eq!(grid.solid_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_is_air_and_ignored() {
        let mut grid = ChunkGrid::new_filled(ChunkDims::new(2, 2), STONE);
        assert_eq!(grid.get(2, 0, 0), BlockId::AIR);
        grid.set(0, 5, 0, BlockId::AIR);
        assert_eq!(grid.solid_count(), 8);
        assert_eq!(grid.get_signed(-1, 0, 0), None);
        assert_eq!(grid.get_signed(1, 1, 1), Some(STONE));
    }

    #[test]
    fn test_from_blocks_checks_length() {
        let dims = ChunkDims::new(2, 2);
        assert_eq!(
            ChunkGrid::from_blocks(dims, vec![STONE; 7]),
            Err(ChunkError::LengthMismatch {
                expected: 8,
                actual: 7
            })
        );
        let grid = ChunkGrid::from_blocks(dims, vec![STONE; 8]).unwrap();
        assert_eq!(grid.get(1, 1, 1), STONE);
    }

    #[test]
    fn test_storage_layout_matches_index_formula() {
        let dims = ChunkDims::new(3, 2);
        let mut blocks = vec![BlockId::AIR; dims.volume()];
        blocks[1 * 9 + 2 * 3 + 1] = STONE;
        let grid = ChunkGrid::from_blocks(dims, blocks).unwrap();
        assert_eq!(grid.get(1, 1, 2), STONE);
    }
}
