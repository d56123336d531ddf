//! Terrain generation seam and a simple fBm heightmap generator.
//!
//! The streamer only needs something that turns a chunk coordinate into a
//! filled grid; [`TerrainGenerator`] is that seam. [`HeightmapGenerator`]
//! layers grass, dirt and stone over multi-octave simplex noise, with water
//! filling the low ground, and is enough to drive the demo and tests.

use noise::{NoiseFn, Simplex};
use strata_voxel::{BlockId, ChunkCoord, ChunkDims, ChunkGrid, blocks};

/// Produces the block grid of a chunk column.
///
/// Implementations must be deterministic for a given coordinate: a chunk
/// evicted and requested again must come back identical.
pub trait TerrainGenerator: Send + Sync {
    fn generate(&self, coord: ChunkCoord, dims: ChunkDims) -> ChunkGrid;
}

impl<F> TerrainGenerator for F
where
    F: Fn(ChunkCoord, ChunkDims) -> ChunkGrid + Send + Sync,
{
    fn generate(&self, coord: ChunkCoord, dims: ChunkDims) -> ChunkGrid {
        self(coord, dims)
    }
}

/// Flat world: `height` layers of `block`, air above.
#[derive(Clone, Copy, Debug)]
pub struct FlatGenerator {
    pub block: BlockId,
    pub height: usize,
}

impl TerrainGenerator for FlatGenerator {
    fn generate(&self, _coord: ChunkCoord, dims: ChunkDims) -> ChunkGrid {
        let mut grid = ChunkGrid::new_air(dims);
        for y in 0..self.height.min(dims.height) {
            for z in 0..dims.size {
                for x in 0..dims.size {
                    grid.set(x, y, z, self.block);
                }
            }
        }
        grid
    }
}

/// Parameters for [`HeightmapGenerator`].
#[derive(Clone, Debug)]
pub struct HeightmapParams {
    /// World seed for deterministic generation.
    pub seed: u64,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles per block.
    pub base_frequency: f64,
    /// Height swing of the first octave, in blocks.
    pub amplitude: f64,
    /// Mean surface height in blocks.
    pub base_height: f64,
    /// Columns whose surface lies below this level are flooded with water.
    pub water_level: usize,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 0.01,
            amplitude: 12.0,
            base_height: 32.0,
            water_level: 28,
        }
    }
}

/// Rolling terrain from fractal simplex noise.
pub struct HeightmapGenerator {
    noise: Simplex,
    params: HeightmapParams,
}

impl HeightmapGenerator {
    pub fn new(params: HeightmapParams) -> Self {
        let noise = Simplex::new(params.seed as u32);
        Self { noise, params }
    }

    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }

    /// Surface height of the world column `(x, z)` in blocks.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;
        for _ in 0..self.params.octaves {
            total += self.noise.get([x as f64 * frequency, z as f64 * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }
        (self.params.base_height + total).round() as i32
    }
}

impl TerrainGenerator for HeightmapGenerator {
    fn generate(&self, coord: ChunkCoord, dims: ChunkDims) -> ChunkGrid {
        let mut grid = ChunkGrid::new_air(dims);
        let (ox, oz) = dims.origin(coord);
        let top = dims.height as i32 - 1;
        let water = self.params.water_level.min(dims.height);

        for z in 0..dims.size {
            for x in 0..dims.size {
                let surface = self.surface_height(ox + x as i32, oz + z as i32).clamp(1, top) as usize;
                let shore = surface <= water + 1;
                for y in 0..=surface {
                    let block = if y == 0 {
                        blocks::BEDROCK
                    } else if y == surface {
                        if shore { blocks::SAND } else { blocks::GRASS }
                    } else if y + 3 >= surface {
                        if shore { blocks::SAND } else { blocks::DIRT }
                    } else {
                        blocks::STONE
                    };
                    grid.set(x, y, z, block);
                }
                for y in surface + 1..water {
                    grid.set(x, y, z, blocks::WATER);
                }
            }
        }
        grid
    }
}
