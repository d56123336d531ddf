//! Chunk column coordinates and world ↔ chunk-local conversions.
//!
//! Chunks are vertical columns: a chunk covers `size × size` blocks
//! horizontally and the full `height` of the world vertically, so a chunk is
//! identified by its `(x, z)` grid position alone.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Identifies a chunk column in the world grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the coordinate offset by `(dx, dz)` chunks.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Squared Euclidean distance in chunk units.
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dz * dz
    }

    /// The four edge-adjacent chunks (+X, −X, +Z, −Z).
    pub fn neighbors(self) -> [ChunkCoord; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }
}

/// Dimensions shared by every chunk in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDims {
    /// Edge length along X and Z.
    pub size: usize,
    /// Extent along Y.
    pub height: usize,
}

impl ChunkDims {
    /// Creates dimensions; both extents are clamped to at least 1.
    pub fn new(size: usize, height: usize) -> Self {
        Self {
            size: size.max(1),
            height: height.max(1),
        }
    }

    /// Total cells per chunk.
    pub fn volume(&self) -> usize {
        self.size * self.size * self.height
    }

    /// Linear index of a local cell: `y * size * size + z * size + x`.
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(self.contains(x, y, z));
        y * self.size * self.size + z * self.size + x
    }

    /// Returns `true` if the local cell lies inside the chunk.
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.size && z < self.size && y < self.height
    }

    /// Returns `true` if a world Y coordinate lies within the vertical range.
    pub fn contains_y(&self, y: i32) -> bool {
        y >= 0 && (y as i64) < self.height as i64
    }

    /// Chunk owning the world block column `(x, z)`.
    pub fn chunk_of(&self, x: i32, z: i32) -> ChunkCoord {
        let s = self.size as i32;
        ChunkCoord::new(x.div_euclid(s), z.div_euclid(s))
    }

    /// Local `(x, z)` of a world block column inside its owning chunk.
    pub fn local_of(&self, x: i32, z: i32) -> (usize, usize) {
        let s = self.size as i32;
        (x.rem_euclid(s) as usize, z.rem_euclid(s) as usize)
    }

    /// World block coordinates of the chunk's local `(0, 0)` column.
    pub fn origin(&self, coord: ChunkCoord) -> (i32, i32) {
        let s = self.size as i32;
        (coord.x * s, coord.z * s)
    }

    /// Chunk containing a continuous world position (`floor(position / size)`).
    pub fn chunk_at_position(&self, position: Vec3) -> ChunkCoord {
        let block = position.floor().as_ivec3();
        self.chunk_of(block.x, block.z)
    }

    /// Chunks whose meshes depend on the block at `pos`: the owning chunk
    /// plus any horizontal neighbor sharing the border the block sits on.
    pub fn chunks_touching(&self, pos: IVec3) -> Vec<ChunkCoord> {
        let owner = self.chunk_of(pos.x, pos.z);
        let (lx, lz) = self.local_of(pos.x, pos.z);
        let last = self.size - 1;

        let mut touched = vec![owner];
        if lx == 0 {
            touched.push(owner.offset(-1, 0));
        }
        if lx == last {
            touched.push(owner.offset(1, 0));
        }
        if lz == 0 {
            touched.push(owner.offset(0, -1));
        }
        if lz == last {
            touched.push(owner.offset(0, 1));
        }
        touched.dedup();
        touched
    }
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self {
            size: 16,
            height: 128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_of_negative_coordinates() {
        let dims = ChunkDims::default();
        assert_eq!(dims.chunk_of(0, 0), ChunkCoord::new(0, 0));
        assert_eq!(dims.chunk_of(15, 15), ChunkCoord::new(0, 0));
        assert_eq!(dims.chunk_of(16, -1), ChunkCoord::new(1, -1));
        assert_eq!(dims.chunk_of(-16, -17), ChunkCoord::new(-1, -2));
    }

    #[test]
    fn test_local_of_wraps_euclidean() {
        let dims = ChunkDims::default();
        assert_eq!(dims.local_of(-1, 17), (15, 1));
        assert_eq!(dims.local_of(-16, 0), (0, 0));
    }

    #[test]
    fn test_index_order_is_y_then_z_then_x() {
        let dims = ChunkDims::new(4, 8);
        assert_eq!(dims.index(1, 0, 0), 1);
        assert_eq!(dims.index(0, 0, 1), 4);
        assert_eq!(dims.index(0, 1, 0), 16);
        assert_eq!(dims.index(3, 7, 3), dims.volume() - 1);
    }

    #[test]
    fn test_chunk_at_position_floors() {
        let dims = ChunkDims::default();
        assert_eq!(
            dims.chunk_at_position(Vec3::new(-0.5, 70.0, 31.9)),
            ChunkCoord::new(-1, 1)
        );
    }

    #[test]
    fn test_chunks_touching_interior_and_corner() {
        let dims = ChunkDims::default();
        assert_eq!(
            dims.chunks_touching(IVec3::new(5, 10, 5)),
            vec![ChunkCoord::new(0, 0)]
        );

        let corner = dims.chunks_touching(IVec3::new(16, 3, 31));
        assert_eq!(corner.len(), 3);
        assert!(corner.contains(&ChunkCoord::new(1, 1)));
        assert!(corner.contains(&ChunkCoord::new(0, 1)));
        assert!(corner.contains(&ChunkCoord::new(1, 2)));
    }

    #[test]
    fn test_single_column_chunk_touches_all_four_neighbors() {
        let dims = ChunkDims::new(1, 4);
        assert_eq!(dims.chunks_touching(IVec3::ZERO).len(), 5);
    }

    #[test]
    fn test_distance_sq() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.distance_sq(ChunkCoord::new(3, -4)), 25);
    }
}
