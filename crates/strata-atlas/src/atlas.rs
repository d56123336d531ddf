//! Block texture atlas: synthesizes one tile per distinct (block, face recipe),
//! packs the tiles into a square grid, and maps (block, face) to UV rects.
//!
//! UV origin is the **top-left** corner of the image: `u` grows right and `v`
//! grows down, matching image row order. A face whose UV `v` is `uv_min.y`
//! samples the first pixel row of its cell.
//!
//! The last packed cell holds the fallback texture, drawn from the registry's
//! fallback colours. Unknown blocks and face names resolve to it.

use std::path::Path;

use glam::Vec2;
use image::{Rgba, RgbaImage};
use noise::Simplex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use strata_voxel::{BlockId, BlockRegistry, FaceDirection};
use thiserror::Error;

use crate::pattern::{TextureRecipe, synthesize};
use crate::recipes::{BlockTextures, RecipeBook};

/// Colour of atlas cells that hold no texture.
pub const MISSING_TEXTURE: Rgba<u8> = Rgba([255, 0, 255, 255]);

// ---------------------------------------------------------------------------
// AtlasError
// ---------------------------------------------------------------------------

/// Errors returned during atlas construction.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Tile size is zero or not a power of two.
    #[error("invalid tile size {0}: must be a non-zero power of 2")]
    InvalidTileSize(u32),

    /// The packed atlas would exceed the configured maximum edge length.
    #[error("{count} textures need a {needed}px atlas, limit is {max}px")]
    TooManyTextures {
        /// Distinct textures requested.
        count: u32,
        /// Edge length the grid would need.
        needed: u32,
        /// Configured limit.
        max: u32,
    },

    /// Every grid slot is taken.
    #[error("atlas is full (max {max} tiles)")]
    AtlasFull {
        /// Number of slots in the grid.
        max: u32,
    },

    /// Writing the image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

// ---------------------------------------------------------------------------
// AtlasConfig
// ---------------------------------------------------------------------------

/// Parameters for atlas synthesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Edge length of one tile in pixels.
    pub tile_size: u32,
    /// Seed every tile's generator is reset to.
    pub seed: u64,
    /// Largest allowed atlas edge in pixels.
    pub max_size: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            tile_size: 16,
            seed: 42,
            max_size: 4096,
        }
    }
}

impl AtlasConfig {
    pub fn validate(&self) -> Result<(), AtlasError> {
        if self.tile_size == 0 || !self.tile_size.is_power_of_two() {
            return Err(AtlasError::InvalidTileSize(self.tile_size));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AtlasBuilder
// ---------------------------------------------------------------------------

/// Places tiles into a fixed `grid × grid` image in raster order.
pub struct AtlasBuilder {
    grid: u32,
    tile_size: u32,
    image: RgbaImage,
    next_slot: u32,
}

impl AtlasBuilder {
    /// Creates a builder whose every cell starts as [`MISSING_TEXTURE`].
    pub fn new(grid: u32, tile_size: u32) -> Self {
        let edge = grid * tile_size;
        Self {
            grid,
            tile_size,
            image: RgbaImage::from_pixel(edge, edge, MISSING_TEXTURE),
            next_slot: 0,
        }
    }

    /// Copies `tile` into the next free cell and returns the cell index.
    ///
    /// Tiles of the wrong size are resized first.
    pub fn add_tile(&mut self, tile: &RgbaImage) -> Result<u32, AtlasError> {
        let max = self.grid * self.grid;
        if self.next_slot >= max {
            return Err(AtlasError::AtlasFull { max });
        }

        let resized;
        let tile = if tile.dimensions() != (self.tile_size, self.tile_size) {
            resized = image::imageops::resize(
                tile,
                self.tile_size,
                self.tile_size,
                image::imageops::FilterType::Nearest,
            );
            &resized
        } else {
            tile
        };

        let col = self.next_slot % self.grid;
        let row = self.next_slot / self.grid;
        // Translucent texels must keep their alpha, not blend over the fill.
        image::imageops::replace(
            &mut self.image,
            tile,
            (col * self.tile_size) as i64,
            (row * self.tile_size) as i64,
        );

        let slot = self.next_slot;
        self.next_slot += 1;
        Ok(slot)
    }

    /// Cells used so far.
    pub fn used_slots(&self) -> u32 {
        self.next_slot
    }

    /// Finishes packing and returns the image.
    pub fn finish(self) -> RgbaImage {
        self.image
    }
}

// ---------------------------------------------------------------------------
// TextureAtlas
// ---------------------------------------------------------------------------

/// Finished atlas image plus the per-block face → cell table.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    image: RgbaImage,
    tile_size: u32,
    grid: u32,
    tile_count: u32,
    /// Indexed by `BlockId.0`, then by `FaceDirection::index()`.
    cells: Vec<[u32; 6]>,
    fallback_cell: u32,
}

impl TextureAtlas {
    /// Synthesizes the atlas for every registered block.
    ///
    /// Blocks are visited in ID order and faces in `top, bottom, front, back,
    /// left, right` order; a recipe already packed for the same block is
    /// reused, so uniform blocks take one cell. The fallback texture is packed
    /// after every block and never shared with one.
    pub fn build(
        registry: &BlockRegistry,
        recipes: &RecipeBook,
        config: &AtlasConfig,
    ) -> Result<Self, AtlasError> {
        config.validate()?;

        const FACE_ORDER: [FaceDirection; 6] = [
            FaceDirection::PosY,
            FaceDirection::NegY,
            FaceDirection::PosZ,
            FaceDirection::NegZ,
            FaceDirection::NegX,
            FaceDirection::PosX,
        ];

        // Pass 1: decide the cell of every face.
        let mut cells = vec![[0u32; 6]; registry.len() + 1];
        let mut tiles: Vec<TextureRecipe> = Vec::new();
        for (id, attrs) in registry.iter() {
            let textures = recipes.resolve(&attrs.name, &attrs.colors);
            let first_of_block = tiles.len();
            for face in FACE_ORDER {
                let recipe = *textures.recipe(face);
                let cell = match tiles[first_of_block..].iter().position(|t| *t == recipe) {
                    Some(offset) => first_of_block + offset,
                    None => {
                        tiles.push(recipe);
                        tiles.len() - 1
                    }
                };
                cells[id.0 as usize][face.index()] = cell as u32;
            }
        }
        let fallback = BlockTextures::from_colors(&registry.fallback().colors);
        tiles.push(*fallback.recipe(FaceDirection::PosY));
        let fallback_cell = (tiles.len() - 1) as u32;
        cells[0] = [fallback_cell; 6];

        let count = tiles.len() as u32;
        let grid = grid_for(count);
        let needed = grid * config.tile_size;
        if needed > config.max_size {
            return Err(AtlasError::TooManyTextures {
                count,
                needed,
                max: config.max_size,
            });
        }

        // Pass 2: draw and pack.
        let noise = Simplex::new(config.seed as u32);
        let mut builder = AtlasBuilder::new(grid, config.tile_size);
        for recipe in &tiles {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            let tile = synthesize(recipe, config.tile_size, &mut rng, &noise);
            builder.add_tile(&tile)?;
        }

        tracing::info!(
            "built texture atlas: {} tiles in a {}x{} grid ({}px)",
            count,
            grid,
            grid,
            needed
        );

        Ok(Self {
            image: builder.finish(),
            tile_size: config.tile_size,
            grid,
            tile_count: count,
            cells,
            fallback_cell,
        })
    }

    /// The packed RGBA image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Cells per row (and per column).
    pub fn grid_size(&self) -> u32 {
        self.grid
    }

    /// Tile edge length in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Number of cells holding a texture.
    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    /// `(column, row)` of a cell, row 0 being the top of the image.
    pub fn cell_coords(&self, cell: u32) -> (u32, u32) {
        (cell % self.grid, cell / self.grid)
    }

    /// Cell holding the fallback texture.
    pub fn fallback_cell(&self) -> u32 {
        self.fallback_cell
    }

    /// Cell holding the texture for a block face.
    ///
    /// Unknown blocks resolve to [`fallback_cell`](Self::fallback_cell).
    pub fn cell(&self, block: BlockId, face: FaceDirection) -> u32 {
        match self.cells.get(block.0 as usize) {
            Some(faces) => faces[face.index()],
            None => {
                tracing::debug!("no atlas cell for block {} {}", block.0, face.name());
                self.fallback_cell
            }
        }
    }

    /// Cell for a block face given by name (`top`, `bottom`, `front`, ...).
    pub fn cell_by_name(&self, block: BlockId, face: &str) -> u32 {
        match FaceDirection::from_name(face) {
            Some(face) => self.cell(block, face),
            None => {
                tracing::debug!("unknown face name {face:?}");
                self.fallback_cell
            }
        }
    }

    /// Returns `(uv_min, uv_max)` for a cell, top-left origin.
    pub fn tile_uvs(&self, cell: u32) -> (Vec2, Vec2) {
        let (col, row) = self.cell_coords(cell);
        let tile_uv = 1.0 / self.grid as f32;
        let u_min = col as f32 * tile_uv;
        let v_min = row as f32 * tile_uv;
        (
            Vec2::new(u_min, v_min),
            Vec2::new(u_min + tile_uv, v_min + tile_uv),
        )
    }

    /// UV rect for a block face.
    pub fn face_uvs(&self, block: BlockId, face: FaceDirection) -> (Vec2, Vec2) {
        self.tile_uvs(self.cell(block, face))
    }

    /// Writes the atlas image as PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), AtlasError> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Smallest `n` with `n * n >= count`, at least 1.
fn grid_for(count: u32) -> u32 {
    let mut n = (count as f64).sqrt().ceil() as u32;
    while n * n < count {
        n += 1;
    }
    n.max(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use strata_voxel::blocks::{FURNACE, GRASS, STONE};
    use strata_voxel::{BlockDef, DropRule, FaceColors, Transparency};

    use super::*;

    fn def(name: &str, colors: FaceColors) -> BlockDef {
        BlockDef {
            name: name.to_string(),
            solid: true,
            transparency: Transparency::Opaque,
            break_time: 1.0,
            tool: None,
            drop: DropRule::Itself,
            colors,
            light_level: 0,
            gravity: false,
        }
    }

    fn standard_atlas() -> TextureAtlas {
        TextureAtlas::build(
            &BlockRegistry::standard(),
            &RecipeBook::standard(),
            &AtlasConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = standard_atlas();
        let b = standard_atlas();
        assert_eq!(a.image().as_raw(), b.image().as_raw());
        assert_eq!(a.cells, b.cells);
        assert_eq!(a.tile_count(), b.tile_count());
    }

    #[test]
    fn test_grid_fits_tile_count() {
        let atlas = standard_atlas();
        let n = atlas.grid_size();
        assert!(n * n >= atlas.tile_count());
        assert!((n - 1) * (n - 1) < atlas.tile_count());
        assert_eq!(atlas.image().width(), n * 16);
        assert_eq!(atlas.image().height(), n * 16);
    }

    #[test]
    fn test_uniform_block_aliases_all_faces() {
        let atlas = standard_atlas();
        let top = atlas.cell(STONE, FaceDirection::PosY);
        for face in FaceDirection::ALL {
            assert_eq!(atlas.cell(STONE, face), top);
        }
    }

    #[test]
    fn test_grass_uses_three_cells() {
        let atlas = standard_atlas();
        let top = atlas.cell(GRASS, FaceDirection::PosY);
        let side = atlas.cell(GRASS, FaceDirection::PosX);
        let bottom = atlas.cell(GRASS, FaceDirection::NegY);
        assert_ne!(top, side);
        assert_ne!(side, bottom);
        assert_ne!(top, bottom);
        for face in FaceDirection::HORIZONTAL {
            assert_eq!(atlas.cell(GRASS, face), side);
        }
        // Grass is the first block, so its top is the first cell.
        assert_eq!(top, 0);
        assert_eq!(atlas.cell_by_name(GRASS, "top"), 0);
    }

    #[test]
    fn test_furnace_front_is_distinct() {
        let atlas = standard_atlas();
        assert_ne!(
            atlas.cell(FURNACE, FaceDirection::PosZ),
            atlas.cell(FURNACE, FaceDirection::NegZ)
        );
        assert_eq!(
            atlas.cell(FURNACE, FaceDirection::PosY),
            atlas.cell(FURNACE, FaceDirection::NegZ)
        );
    }

    #[test]
    fn test_lookup_miss_resolves_to_dedicated_fallback_cell() {
        let registry = BlockRegistry::standard();
        let atlas = standard_atlas();
        let fallback = atlas.fallback_cell();
        assert_eq!(fallback, atlas.tile_count() - 1);
        assert_eq!(atlas.cell(BlockId(999), FaceDirection::PosY), fallback);
        assert_eq!(atlas.cell_by_name(STONE, "diagonal"), fallback);

        for (id, _) in registry.iter() {
            for face in FaceDirection::ALL {
                assert_ne!(atlas.cell(id, face), fallback, "{id:?} {face:?}");
            }
        }

        let (col, row) = atlas.cell_coords(fallback);
        let px = atlas.image().get_pixel(col * 16 + 8, row * 16 + 8);
        assert_ne!(*px, MISSING_TEXTURE);
        // Grey speckle: channels stay close together.
        let [r, g, b, a] = px.0;
        assert_eq!(a, 255);
        assert!(r.abs_diff(g) < 40 && g.abs_diff(b) < 40);
    }

    #[test]
    fn test_uv_origin_is_top_left() {
        let atlas = standard_atlas();
        let side = atlas.cell(GRASS, FaceDirection::PosX);
        let (col, row) = atlas.cell_coords(side);
        let (uv_min, uv_max) = atlas.tile_uvs(side);

        let w = atlas.image().width() as f32;
        let h = atlas.image().height() as f32;
        assert_eq!((uv_min.x * w).round() as u32, col * 16);
        assert_eq!((uv_min.y * h).round() as u32, row * 16);
        assert_eq!((uv_max.y * h).round() as u32, (row + 1) * 16);

        // The grass band sits on the cell's first pixel row, i.e. at uv_min.y.
        let top_px = atlas.image().get_pixel(col * 16 + 3, row * 16);
        assert!(top_px.0[1] > top_px.0[0], "top row should be grass green");
        let bottom_px = atlas.image().get_pixel(col * 16 + 3, row * 16 + 15);
        assert!(bottom_px.0[0] > bottom_px.0[2], "bottom row should be dirt");
    }

    #[test]
    fn test_uvs_within_unit_range_and_adjacent() {
        let atlas = standard_atlas();
        for cell in 0..atlas.grid_size() * atlas.grid_size() {
            let (min, max) = atlas.tile_uvs(cell);
            assert!(min.x >= 0.0 && min.y >= 0.0 && max.x <= 1.0001 && max.y <= 1.0001);
            assert!(min.x < max.x && min.y < max.y);
        }
        let (_, left_max) = atlas.tile_uvs(0);
        let (right_min, _) = atlas.tile_uvs(1);
        assert!((left_max.x - right_min.x).abs() < 1e-6);
    }

    #[test]
    fn test_unused_cells_are_magenta() {
        let mut registry = BlockRegistry::new();
        for name in ["a", "b", "c", "d", "e"] {
            registry
                .register(def(name, FaceColors::uniform([10, 10, 10])))
                .unwrap();
        }
        let atlas =
            TextureAtlas::build(&registry, &RecipeBook::new(), &AtlasConfig::default()).unwrap();
        // Five blocks plus the fallback tile.
        assert_eq!(atlas.tile_count(), 6);
        assert_eq!(atlas.grid_size(), 3);
        for cell in 6..9 {
            let (col, row) = atlas.cell_coords(cell);
            assert_eq!(*atlas.image().get_pixel(col * 16 + 8, row * 16 + 8), MISSING_TEXTURE);
        }
        assert_ne!(*atlas.image().get_pixel(8, 8), MISSING_TEXTURE);
    }

    #[test]
    fn test_split_colors_pack_three_cells() {
        let mut registry = BlockRegistry::new();
        registry
            .register(def(
                "mossy",
                FaceColors {
                    top: [0, 200, 0],
                    side: [90, 90, 90],
                    bottom: [60, 60, 60],
                },
            ))
            .unwrap();
        let atlas =
            TextureAtlas::build(&registry, &RecipeBook::new(), &AtlasConfig::default()).unwrap();
        assert_eq!(atlas.tile_count(), 4);
        assert_eq!(atlas.grid_size(), 2);
    }

    #[test]
    fn test_empty_registry_builds_fallback_cell_only() {
        let atlas = TextureAtlas::build(
            &BlockRegistry::new(),
            &RecipeBook::new(),
            &AtlasConfig::default(),
        )
        .unwrap();
        assert_eq!(atlas.tile_count(), 1);
        assert_eq!(atlas.grid_size(), 1);
        assert_eq!(atlas.fallback_cell(), 0);
        assert_eq!(atlas.cell(BlockId(1), FaceDirection::PosY), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let registry = BlockRegistry::standard();
        let config = AtlasConfig {
            tile_size: 12,
            ..AtlasConfig::default()
        };
        assert!(matches!(
            TextureAtlas::build(&registry, &RecipeBook::standard(), &config),
            Err(AtlasError::InvalidTileSize(12))
        ));

        let config = AtlasConfig {
            max_size: 32,
            ..AtlasConfig::default()
        };
        assert!(matches!(
            TextureAtlas::build(&registry, &RecipeBook::standard(), &config),
            Err(AtlasError::TooManyTextures { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_overflow_and_resizes() {
        let mut builder = AtlasBuilder::new(2, 16);
        let small = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        for expected in 0..4 {
            assert_eq!(builder.add_tile(&small).unwrap(), expected);
        }
        assert!(matches!(
            builder.add_tile(&small),
            Err(AtlasError::AtlasFull { max: 4 })
        ));
        let image = builder.finish();
        assert_eq!(*image.get_pixel(31, 31), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        standard_atlas().save_png(&path).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded.dimensions(), standard_atlas().image().dimensions());
    }
}
