//! Face visibility culling: decides which faces of each block are exposed.
//!
//! A face is emitted when the neighbouring cell is air or transparent, except
//! between two transparent blocks of the same type (water next to water,
//! glass next to glass), which would otherwise show internal surfaces.

use strata_voxel::{BlockId, BlockRegistry, ChunkGrid, FaceDirection};

use crate::visible_faces::VisibleFaces;

/// Returns `true` if `voxel`'s face toward `neighbor` should be drawn.
pub fn face_visible(registry: &BlockRegistry, voxel: BlockId, neighbor: BlockId) -> bool {
    if neighbor.is_air() {
        return true;
    }
    if !registry.is_transparent(neighbor) {
        return false;
    }
    !(registry.is_transparent(voxel) && voxel == neighbor)
}

/// Block on the far side of `face` from the local cell `(x, y, z)`.
///
/// Cells inside the grid are read directly; anything else is handed to
/// `neighbor_fn` in world coordinates, `origin` being the chunk's minimum
/// world X/Z corner.
pub fn neighbor_block<F>(
    grid: &ChunkGrid,
    origin: (i32, i32),
    (x, y, z): (usize, usize, usize),
    face: FaceDirection,
    neighbor_fn: &F,
) -> BlockId
where
    F: Fn(i32, i32, i32) -> BlockId,
{
    let (nx, ny, nz) = face.offset(x as i32, y as i32, z as i32);
    match grid.get_signed(nx, ny, nz) {
        Some(block) => block,
        None => neighbor_fn(origin.0 + nx, ny, origin.1 + nz),
    }
}

/// Visible faces of the block at a local cell. Air has none.
pub fn visible_faces_at<F>(
    grid: &ChunkGrid,
    origin: (i32, i32),
    pos: (usize, usize, usize),
    neighbor_fn: &F,
    registry: &BlockRegistry,
) -> VisibleFaces
where
    F: Fn(i32, i32, i32) -> BlockId,
{
    let voxel = grid.get(pos.0, pos.1, pos.2);
    if voxel.is_air() {
        return VisibleFaces::NONE;
    }

    let mut faces = VisibleFaces::NONE;
    for dir in FaceDirection::ALL {
        let neighbor = neighbor_block(grid, origin, pos, dir, neighbor_fn);
        if face_visible(registry, voxel, neighbor) {
            faces.set_visible(dir);
        }
    }
    faces
}

/// Computes visible faces for every cell, indexed like the grid's storage.
pub fn compute_visible_faces<F>(
    grid: &ChunkGrid,
    origin: (i32, i32),
    neighbor_fn: F,
    registry: &BlockRegistry,
) -> Vec<VisibleFaces>
where
    F: Fn(i32, i32, i32) -> BlockId,
{
    let dims = grid.dims();
    let mut result = vec![VisibleFaces::NONE; dims.volume()];
    for y in 0..dims.height {
        for z in 0..dims.size {
            for x in 0..dims.size {
                result[dims.index(x, y, z)] =
                    visible_faces_at(grid, origin, (x, y, z), &neighbor_fn, registry);
            }
        }
    }
    result
}

/// Counts the total number of visible faces in a visibility array.
pub fn count_visible_faces(faces: &[VisibleFaces]) -> u32 {
    faces.iter().map(|vf| vf.count()).sum()
}
