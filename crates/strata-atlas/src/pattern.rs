//! Procedural tile patterns.
//!
//! Each [`TexturePattern`] is a small parameter set; [`synthesize`] turns a
//! pattern plus a base colour into one square RGBA tile. All randomness comes
//! from the caller's RNG and noise source, so a tile is fully determined by
//! its recipe and seed.

use image::{Rgba, RgbaImage};
use noise::{NoiseFn, Simplex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use strata_voxel::Rgb;

/// How a tile is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TexturePattern {
    /// Independent per-pixel jitter around the base colour.
    Speckle { variance: u8 },
    /// Smooth noise bands (stone, dirt, gravel).
    Mottled { scale: f32, variance: u8 },
    /// Mottled base with clustered spots of another colour.
    Ore { spot: Rgb, spots: u8 },
    /// Staggered brick courses separated by mortar.
    Bricks { mortar: Rgb },
    /// Horizontal boards with dark seams.
    Planks,
    /// Concentric growth rings with a bark rim.
    LogRings { bark: Rgb },
    /// Vertical streaks.
    Bark,
    /// Speckle with see-through holes.
    Leaves,
    /// Dirt with a ragged grass band along the top edge.
    GrassSide { grass: Rgb },
    /// Mostly clear pane with an opaque frame.
    Glass { frame: Rgb },
    /// Translucent ripples.
    Water,
    /// Planks with a dark 3×3 grid on top.
    CraftingGrid { grid: Rgb },
    /// Stone face with a dark opening and embers.
    FurnaceFront { fire: Rgb },
    /// Planks with a rim and a metal latch.
    ChestFront { latch: Rgb },
}

/// A pattern, its base colour and an overall opacity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureRecipe {
    pub pattern: TexturePattern,
    pub color: Rgb,
    #[serde(default = "opaque")]
    pub opacity: u8,
}

fn opaque() -> u8 {
    255
}

impl TextureRecipe {
    /// Fully opaque recipe.
    pub const fn new(pattern: TexturePattern, color: Rgb) -> Self {
        Self {
            pattern,
            color,
            opacity: 255,
        }
    }

    /// Same recipe with a different overall opacity.
    pub const fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }
}

// ---------------------------------------------------------------------------
// Colour helpers
// ---------------------------------------------------------------------------

fn rgba(c: Rgb, a: u8) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], a])
}

fn shade(c: Rgb, factor: f32) -> Rgb {
    c.map(|v| (v as f32 * factor).round().clamp(0.0, 255.0) as u8)
}

fn vary(c: Rgb, variance: u8, rng: &mut ChaCha8Rng) -> Rgb {
    if variance == 0 {
        return c;
    }
    let v = variance as i16;
    c.map(|ch| (ch as i16 + rng.random_range(-v..=v)).clamp(0, 255) as u8)
}

/// Noise in `0.0..=1.0` at a tile pixel.
fn noise01(noise: &Simplex, x: u32, y: u32, scale: f32) -> f32 {
    let n = noise.get([x as f64 * scale as f64, y as f64 * scale as f64]) as f32;
    (n * 0.5 + 0.5).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Draws one `size × size` tile.
pub fn synthesize(
    recipe: &TextureRecipe,
    size: u32,
    rng: &mut ChaCha8Rng,
    noise: &Simplex,
) -> RgbaImage {
    let base = recipe.color;
    let mut img = RgbaImage::new(size, size);

    match recipe.pattern {
        TexturePattern::Speckle { variance } => {
            speckle(&mut img, base, variance, rng);
        }
        TexturePattern::Mottled { scale, variance } => {
            mottle(&mut img, base, scale, variance, rng, noise);
        }
        TexturePattern::Ore { spot, spots } => {
            mottle(&mut img, base, 0.3, 10, rng, noise);
            for _ in 0..spots {
                let cx = rng.random_range(0..size);
                let cy = rng.random_range(0..size);
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    if rng.random_bool(0.75) {
                        let (x, y) = ((cx + dx) % size, (cy + dy) % size);
                        img.put_pixel(x, y, rgba(vary(spot, 12, rng), 255));
                    }
                }
            }
        }
        TexturePattern::Bricks { mortar } => {
            let course = (size / 4).max(2);
            let brick = (size / 2).max(2);
            for y in 0..size {
                let row = y / course;
                let offset = if row % 2 == 0 { 0 } else { brick / 2 };
                for x in 0..size {
                    let joint = (x + offset) % brick == 0;
                    let bed = y % course == course - 1;
                    let color = if joint || bed {
                        vary(mortar, 6, rng)
                    } else {
                        let id = (x + offset) / brick + row * 7;
                        vary(shade(base, 0.9 + (id % 3) as f32 * 0.07), 8, rng)
                    };
                    img.put_pixel(x, y, rgba(color, 255));
                }
            }
        }
        TexturePattern::Planks => planks(&mut img, base, rng),
        TexturePattern::LogRings { bark } => {
            let center = (size as f32 - 1.0) * 0.5;
            let ring_width = (size as f32 / 8.0).max(1.0);
            for y in 0..size {
                for x in 0..size {
                    let d = ((x as f32 - center).powi(2) + (y as f32 - center).powi(2)).sqrt();
                    let color = if d >= center {
                        vary(bark, 6, rng)
                    } else if (d / ring_width) as u32 % 2 == 0 {
                        vary(base, 6, rng)
                    } else {
                        vary(shade(base, 0.82), 6, rng)
                    };
                    img.put_pixel(x, y, rgba(color, 255));
                }
            }
        }
        TexturePattern::Bark => {
            for x in 0..size {
                let streak = rng.random_range(0.78..1.1_f32);
                for y in 0..size {
                    img.put_pixel(x, y, rgba(vary(shade(base, streak), 6, rng), 255));
                }
            }
        }
        TexturePattern::Leaves => {
            for y in 0..size {
                for x in 0..size {
                    let hole = rng.random_bool(0.18);
                    let color = vary(shade(base, rng.random_range(0.8..1.15_f32)), 10, rng);
                    img.put_pixel(x, y, rgba(color, if hole { 0 } else { 255 }));
                }
            }
        }
        TexturePattern::GrassSide { grass } => {
            mottle(&mut img, base, 0.4, 10, rng, noise);
            let min_depth = (size / 8).max(1);
            let max_depth = (size / 4 + 1).max(min_depth);
            for x in 0..size {
                let depth = rng.random_range(min_depth..=max_depth).min(size);
                for y in 0..depth {
                    img.put_pixel(x, y, rgba(vary(grass, 8, rng), 255));
                }
            }
        }
        TexturePattern::Glass { frame } => {
            let last = size - 1;
            for y in 0..size {
                for x in 0..size {
                    let edge = x == 0 || y == 0 || x == last || y == last;
                    let glint = x + y == size / 2 || x + y == size / 2 + 1;
                    let px = if edge {
                        rgba(frame, 255)
                    } else if glint {
                        rgba(shade(base, 1.1), 140)
                    } else {
                        rgba(base, 48)
                    };
                    img.put_pixel(x, y, px);
                }
            }
        }
        TexturePattern::Water => {
            for y in 0..size {
                for x in 0..size {
                    let wave = ((x as f32 * 0.7 + y as f32 * 0.35).sin() * 0.5 + 0.5) * 0.15;
                    let n = noise01(noise, x, y, 0.25) * 0.1;
                    let color = vary(shade(base, 0.9 + wave + n), 4, rng);
                    img.put_pixel(x, y, rgba(color, 255));
                }
            }
        }
        TexturePattern::CraftingGrid { grid } => {
            planks(&mut img, base, rng);
            let last = size - 1;
            let third = (size / 3).max(1);
            for y in 0..size {
                for x in 0..size {
                    let border = x == 0 || y == 0 || x == last || y == last;
                    let line = (x % third == 0 || y % third == 0) && x < 3 * third && y < 3 * third;
                    if border || line {
                        img.put_pixel(x, y, rgba(grid, 255));
                    }
                }
            }
        }
        TexturePattern::FurnaceFront { fire } => {
            mottle(&mut img, base, 0.3, 10, rng, noise);
            let (lo, hi) = (size * 3 / 16, size * 13 / 16);
            let frame = shade(base, 0.5);
            for y in lo..hi {
                for x in lo..hi {
                    let edge = x == lo || y == lo || x == hi - 1 || y == hi - 1;
                    let ember = y >= size * 7 / 16 && (x + y) % 2 == 0;
                    let color = if edge {
                        frame
                    } else if ember {
                        shade(fire, rng.random_range(0.85..1.1_f32))
                    } else {
                        shade(base, 0.25)
                    };
                    img.put_pixel(x, y, rgba(color, 255));
                }
            }
        }
        TexturePattern::ChestFront { latch } => {
            let dark = shade(base, 0.78);
            for y in 0..size {
                let grain = (y as f32 * 0.25).sin() * 0.08;
                for x in 0..size {
                    img.put_pixel(x, y, rgba(vary(shade(base, 1.0 - grain), 6, rng), 255));
                }
            }
            for x in 0..size {
                img.put_pixel(x, 0, rgba(shade(base, 1.2), 255));
                img.put_pixel(x, size - 1, rgba(dark, 255));
            }
            for y in 0..size {
                img.put_pixel(0, y, rgba(dark, 255));
                img.put_pixel(size - 1, y, rgba(dark, 255));
            }
            let (lx, ly) = (size * 6 / 16, size * 5 / 16);
            for y in ly..(size * 10 / 16).max(ly + 1) {
                for x in lx..(size * 10 / 16).max(lx + 1) {
                    img.put_pixel(x, y, rgba(latch, 255));
                }
            }
        }
    }

    if recipe.opacity < 255 {
        for px in img.pixels_mut() {
            px.0[3] = ((px.0[3] as u16 * recipe.opacity as u16) / 255) as u8;
        }
    }
    img
}

fn speckle(img: &mut RgbaImage, base: Rgb, variance: u8, rng: &mut ChaCha8Rng) {
    for px in img.pixels_mut() {
        *px = rgba(vary(base, variance, rng), 255);
    }
}

fn mottle(
    img: &mut RgbaImage,
    base: Rgb,
    scale: f32,
    variance: u8,
    rng: &mut ChaCha8Rng,
    noise: &Simplex,
) {
    let (w, h) = img.dimensions();
    for y in 0..h {
        for x in 0..w {
            let n = noise01(noise, x, y, scale);
            let factor = match n {
                n if n < 0.25 => 0.8,
                n if n < 0.5 => 0.93,
                n if n < 0.8 => 1.05,
                _ => 1.15,
            };
            img.put_pixel(x, y, rgba(vary(shade(base, factor), variance, rng), 255));
        }
    }
}

fn planks(img: &mut RgbaImage, base: Rgb, rng: &mut ChaCha8Rng) {
    let (size, _) = img.dimensions();
    let board = (size / 4).max(2);
    for y in 0..size {
        let index = y / board;
        let tone = if index % 2 == 0 { 1.0 } else { 0.92 };
        for x in 0..size {
            let color = if y % board == board - 1 {
                shade(base, 0.7)
            } else {
                vary(shade(base, tone), 7, rng)
            };
            img.put_pixel(x, y, rgba(color, 255));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn draw(recipe: TextureRecipe) -> RgbaImage {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let noise = Simplex::new(42);
        synthesize(&recipe, 16, &mut rng, &noise)
    }

    #[test]
    fn test_same_seed_same_pixels() {
        let recipe = TextureRecipe::new(
            TexturePattern::Mottled {
                scale: 0.3,
                variance: 10,
            },
            [127, 127, 127],
        );
        assert_eq!(draw(recipe), draw(recipe));
    }

    #[test]
    fn test_every_pattern_fills_the_tile() {
        let patterns = [
            TexturePattern::Speckle { variance: 8 },
            TexturePattern::Mottled {
                scale: 0.3,
                variance: 10,
            },
            TexturePattern::Ore {
                spot: [0, 0, 0],
                spots: 8,
            },
            TexturePattern::Bricks {
                mortar: [180, 170, 160],
            },
            TexturePattern::Planks,
            TexturePattern::LogRings { bark: [74, 55, 40] },
            TexturePattern::Bark,
            TexturePattern::Leaves,
            TexturePattern::GrassSide {
                grass: [122, 182, 72],
            },
            TexturePattern::Glass {
                frame: [220, 230, 240],
            },
            TexturePattern::Water,
            TexturePattern::CraftingGrid { grid: [60, 40, 20] },
            TexturePattern::FurnaceFront {
                fire: [255, 140, 0],
            },
            TexturePattern::ChestFront {
                latch: [75, 75, 85],
            },
        ];
        for pattern in patterns {
            let img = draw(TextureRecipe::new(pattern, [120, 100, 80]));
            assert_eq!(img.dimensions(), (16, 16), "{pattern:?}");
        }
    }

    #[test]
    fn test_grass_side_top_row_is_grass() {
        let grass = [122, 182, 72];
        let img = draw(TextureRecipe::new(
            TexturePattern::GrassSide { grass },
            [139, 105, 20],
        ));
        for x in 0..16 {
            let px = img.get_pixel(x, 0);
            assert!(px.0[1] > px.0[0], "column {x} top pixel is not green");
        }
        // The bottom row stays dirt.
        let px = img.get_pixel(0, 15);
        assert!(px.0[0] > px.0[2]);
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let img = draw(
            TextureRecipe::new(TexturePattern::Speckle { variance: 0 }, [10, 20, 30])
                .with_opacity(128),
        );
        assert!(img.pixels().all(|p| p.0 == [10, 20, 30, 128]));
    }

    #[test]
    fn test_glass_interior_is_translucent() {
        let img = draw(TextureRecipe::new(
            TexturePattern::Glass {
                frame: [220, 230, 240],
            },
            [192, 224, 255],
        ));
        assert_eq!(img.get_pixel(0, 0).0[3], 255);
        assert!(img.get_pixel(3, 12).0[3] < 255);
    }
}
