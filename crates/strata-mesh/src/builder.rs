//! Chunk mesh construction with face culling and atlas texturing.
//!
//! Blocks are visited in `(y, z, x)` order and each exposed face becomes one
//! quad. Faces of transparent blocks go to the translucent mesh so they can
//! be drawn after the opaque pass with blending.

use strata_atlas::TextureAtlas;
use strata_voxel::{BlockId, BlockRegistry, ChunkGrid, ChunkSnapshot};

use crate::chunk_mesh::ChunkMeshes;
use crate::visibility::visible_faces_at;

/// Builds the opaque and translucent meshes of one chunk.
///
/// `origin` is the chunk's minimum world X/Z corner. `neighbor_fn` answers
/// for any cell outside the grid, in world coordinates; it must return air
/// for positions it knows nothing about.
pub fn build_chunk_mesh<F>(
    grid: &ChunkGrid,
    origin: (i32, i32),
    neighbor_fn: F,
    registry: &BlockRegistry,
    atlas: &TextureAtlas,
) -> ChunkMeshes
where
    F: Fn(i32, i32, i32) -> BlockId,
{
    let dims = grid.dims();
    let mut meshes = ChunkMeshes::default();

    for y in 0..dims.height {
        for z in 0..dims.size {
            for x in 0..dims.size {
                let block = grid.get(x, y, z);
                if block.is_air() {
                    continue;
                }
                let visible = visible_faces_at(grid, origin, (x, y, z), &neighbor_fn, registry);
                if visible.count() == 0 {
                    continue;
                }

                let target = if registry.is_transparent(block) {
                    &mut meshes.translucent
                } else {
                    &mut meshes.opaque
                };
                for face in visible.iter() {
                    let (uv_min, uv_max) = atlas.face_uvs(block, face);
                    target.push_face(face, (x, y, z), uv_min.to_array(), uv_max.to_array());
                }
            }
        }
    }

    meshes
}

/// Meshes a captured snapshot, reading neighbours from its boundary slabs.
pub fn build_snapshot_mesh(
    snapshot: &ChunkSnapshot,
    registry: &BlockRegistry,
    atlas: &TextureAtlas,
) -> ChunkMeshes {
    build_chunk_mesh(
        snapshot.grid(),
        snapshot.origin(),
        |x, y, z| snapshot.border_block(x, y, z),
        registry,
        atlas,
    )
}

#[cfg(test)]
mod tests {
    use glam::IVec3;
    use strata_atlas::{AtlasConfig, RecipeBook};
    use strata_voxel::{ChunkCoord, ChunkDims, ChunkStore, FaceDirection, blocks};

    use super::*;

    fn air(_: i32, _: i32, _: i32) -> BlockId {
        BlockId::AIR
    }

    fn fixtures() -> (BlockRegistry, TextureAtlas) {
        let registry = BlockRegistry::standard();
        let atlas = TextureAtlas::build(&registry, &RecipeBook::standard(), &AtlasConfig::default())
            .expect("standard atlas");
        (registry, atlas)
    }

    fn dims() -> ChunkDims {
        ChunkDims::new(4, 4)
    }

    #[test]
    fn test_empty_chunk_produces_empty_meshes() {
        let (registry, atlas) = fixtures();
        let grid = ChunkGrid::new_air(dims());
        let meshes = build_chunk_mesh(&grid, (0, 0), air, &registry, &atlas);
        assert!(meshes.is_empty());
        assert_eq!(meshes.triangle_count(), 0);
    }

    #[test]
    fn test_single_block_has_six_faces() {
        let (registry, atlas) = fixtures();
        let mut grid = ChunkGrid::new_air(dims());
        grid.set(1, 1, 1, blocks::STONE);
        let meshes = build_chunk_mesh(&grid, (0, 0), air, &registry, &atlas);
        assert_eq!(meshes.opaque.face_count(), 6);
        assert_eq!(meshes.opaque.vertices.len(), 24);
        assert_eq!(meshes.opaque.indices.len(), 36);
        assert!(meshes.translucent.is_empty());
    }

    #[test]
    fn test_two_cube_of_stone_has_twenty_four_faces() {
        let (registry, atlas) = fixtures();
        let mut grid = ChunkGrid::new_air(dims());
        for y in 1..3 {
            for z in 1..3 {
                for x in 1..3 {
                    grid.set(x, y, z, blocks::STONE);
                }
            }
        }
        let meshes = build_chunk_mesh(&grid, (0, 0), air, &registry, &atlas);
        assert_eq!(meshes.face_count(), 24);
        assert_eq!(meshes.triangle_count(), 48);
        for face in FaceDirection::ALL {
            assert_eq!(meshes.opaque.count_faces_for_direction(face), 4);
        }
    }

    #[test]
    fn test_full_chunk_culls_interior() {
        let (registry, atlas) = fixtures();
        let grid = ChunkGrid::new_filled(dims(), blocks::STONE);

        let open = build_chunk_mesh(&grid, (0, 0), air, &registry, &atlas);
        // 4x4 on each of the six outer faces.
        assert_eq!(open.face_count(), 6 * 16);

        let walled = |_: i32, y: i32, _: i32| {
            if (0..4).contains(&y) { blocks::STONE } else { BlockId::AIR }
        };
        let closed = build_chunk_mesh(&grid, (0, 0), walled, &registry, &atlas);
        assert_eq!(closed.face_count(), 2 * 16);
        assert_eq!(closed.opaque.count_faces_for_direction(FaceDirection::PosY), 16);
        assert_eq!(closed.opaque.count_faces_for_direction(FaceDirection::NegY), 16);
    }

    #[test]
    fn test_water_body_has_no_internal_faces() {
        let (registry, atlas) = fixtures();
        let mut grid = ChunkGrid::new_air(dims());
        grid.set(0, 0, 0, blocks::WATER);
        grid.set(1, 0, 0, blocks::WATER);
        let meshes = build_chunk_mesh(&grid, (0, 0), air, &registry, &atlas);
        assert!(meshes.opaque.is_empty());
        assert_eq!(meshes.translucent.face_count(), 10);
    }

    #[test]
    fn test_stone_under_water_shows_top_only_from_stone() {
        let (registry, atlas) = fixtures();
        let mut grid = ChunkGrid::new_air(dims());
        grid.set(0, 0, 0, blocks::STONE);
        grid.set(0, 1, 0, blocks::WATER);
        let meshes = build_chunk_mesh(&grid, (0, 0), air, &registry, &atlas);
        assert_eq!(meshes.opaque.count_faces_for_direction(FaceDirection::PosY), 1);
        assert_eq!(meshes.translucent.count_faces_for_direction(FaceDirection::NegY), 0);
        assert_eq!(meshes.face_count(), 6 + 5);
    }

    #[test]
    fn test_vertices_are_chunk_local() {
        let (registry, atlas) = fixtures();
        let mut grid = ChunkGrid::new_air(dims());
        grid.set(3, 2, 3, blocks::DIRT);
        let meshes = build_chunk_mesh(&grid, (-64, 128), air, &registry, &atlas);
        for v in &meshes.opaque.vertices {
            assert!((3.0..=4.0).contains(&v.position[0]));
            assert!((2.0..=3.0).contains(&v.position[1]));
            assert!((3.0..=4.0).contains(&v.position[2]));
        }
    }

    #[test]
    fn test_faces_sample_their_atlas_cell() {
        let (registry, atlas) = fixtures();
        let mut grid = ChunkGrid::new_air(dims());
        grid.set(1, 1, 1, blocks::GRASS);
        let meshes = build_chunk_mesh(&grid, (0, 0), air, &registry, &atlas);

        for quad in meshes.opaque.vertices.chunks_exact(4) {
            let face = FaceDirection::ALL
                .into_iter()
                .find(|f| f.normal() == quad[0].normal)
                .expect("known normal");
            let (min, max) = atlas.face_uvs(blocks::GRASS, face);
            for v in quad {
                assert!(v.uv[0] >= min.x && v.uv[0] <= max.x);
                assert!(v.uv[1] >= min.y && v.uv[1] <= max.y);
            }
        }
        assert_ne!(
            atlas.cell(blocks::GRASS, FaceDirection::PosY),
            atlas.cell(blocks::GRASS, FaceDirection::PosX)
        );
    }

    #[test]
    fn test_unknown_block_renders_opaque_with_fallback_tile() {
        let (registry, atlas) = fixtures();
        let mut grid = ChunkGrid::new_air(dims());
        grid.set(0, 0, 0, BlockId(999));
        let meshes = build_chunk_mesh(&grid, (0, 0), air, &registry, &atlas);
        assert_eq!(meshes.opaque.face_count(), 6);
        assert!(meshes.translucent.is_empty());

        let (min, max) = atlas.tile_uvs(atlas.fallback_cell());
        for v in &meshes.opaque.vertices {
            assert!(v.uv[0] >= min.x && v.uv[0] <= max.x);
            assert!(v.uv[1] >= min.y && v.uv[1] <= max.y);
        }
        // Never mistaken for a real block's texture.
        let (grass_min, _) = atlas.face_uvs(blocks::GRASS, FaceDirection::PosY);
        assert_ne!(min, grass_min);
    }

    #[test]
    fn test_neighbor_chunk_hides_border_faces() {
        let (registry, atlas) = fixtures();
        let mut store = ChunkStore::new(dims());
        let a = ChunkCoord::new(0, 0);
        let b = ChunkCoord::new(1, 0);
        let mut grid = ChunkGrid::new_air(dims());
        grid.set(3, 0, 0, blocks::STONE);
        store.set(a, grid).expect("dims match");
        let mut grid = ChunkGrid::new_air(dims());
        grid.set(0, 0, 0, blocks::STONE);
        store.set(b, grid).expect("dims match");

        let snapshot = store.snapshot(a).expect("resident");
        let meshes = build_snapshot_mesh(&snapshot, &registry, &atlas);
        assert_eq!(meshes.opaque.count_faces_for_direction(FaceDirection::PosX), 0);
        assert_eq!(meshes.face_count(), 5);
    }

    #[test]
    fn test_break_then_replace_restores_mesh() {
        let (registry, atlas) = fixtures();
        let mut store = ChunkStore::new(dims());
        let coord = ChunkCoord::new(0, 0);
        let mut grid = ChunkGrid::new_air(dims());
        grid.set(1, 0, 1, blocks::STONE);
        grid.set(2, 0, 1, blocks::STONE);
        store.set(coord, grid).expect("dims match");

        let mesh_of = |store: &ChunkStore| {
            build_snapshot_mesh(&store.snapshot(coord).expect("resident"), &registry, &atlas)
        };
        let before = mesh_of(&store);
        assert_eq!(before.face_count(), 10);

        store.set_overlay(2, 0, 1, BlockId::AIR);
        let broken = mesh_of(&store);
        assert_eq!(broken.face_count(), 6);
        assert_eq!(store.block_at_pos(IVec3::new(2, 0, 1)), BlockId::AIR);

        store.set_overlay(2, 0, 1, blocks::STONE);
        assert_eq!(mesh_of(&store), before);
    }
}
