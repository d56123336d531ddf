//! Procedural block texture atlas: declarative recipes, seeded tile synthesis, grid packing.

pub mod atlas;
pub mod pattern;
pub mod recipes;

pub use atlas::{AtlasBuilder, AtlasConfig, AtlasError, MISSING_TEXTURE, TextureAtlas};
pub use pattern::{TexturePattern, TextureRecipe, synthesize};
pub use recipes::{BlockTextures, RecipeBook};
