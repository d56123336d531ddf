//! Which pattern each block face is drawn with.
//!
//! A [`RecipeBook`] maps block names to [`BlockTextures`]. The standard book
//! covers the standard palette; any block without an entry gets speckle noise
//! over its registry colours, so new content always has a texture.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strata_voxel::{FaceColors, FaceDirection, Rgb};

use crate::pattern::{TexturePattern, TextureRecipe};

/// Texture assignment for the six faces of one block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BlockTextures {
    /// All six faces use the same texture.
    Uniform(TextureRecipe),
    /// Distinct top, side and bottom, with an optional distinct front (+Z).
    TopSideBottom {
        top: TextureRecipe,
        side: TextureRecipe,
        bottom: TextureRecipe,
        #[serde(default)]
        front: Option<TextureRecipe>,
    },
}

impl BlockTextures {
    /// Recipe used for one face.
    pub fn recipe(&self, face: FaceDirection) -> &TextureRecipe {
        match self {
            Self::Uniform(recipe) => recipe,
            Self::TopSideBottom {
                top,
                side,
                bottom,
                front,
            } => match face {
                FaceDirection::PosY => top,
                FaceDirection::NegY => bottom,
                FaceDirection::PosZ => front.as_ref().unwrap_or(side),
                _ => side,
            },
        }
    }

    /// Default textures derived from registry colours alone.
    pub fn from_colors(colors: &FaceColors) -> Self {
        let speckle = |c: Rgb| TextureRecipe::new(TexturePattern::Speckle { variance: 10 }, c);
        if colors.is_uniform() {
            Self::Uniform(speckle(colors.side))
        } else {
            Self::TopSideBottom {
                top: speckle(colors.top),
                side: speckle(colors.side),
                bottom: speckle(colors.bottom),
                front: None,
            }
        }
    }
}

/// Name-keyed texture table.
#[derive(Clone, Debug, Default)]
pub struct RecipeBook {
    entries: FxHashMap<String, BlockTextures>,
}

impl RecipeBook {
    /// An empty book; every block falls back to [`BlockTextures::from_colors`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a RON map of block name to [`BlockTextures`].
    pub fn from_ron_str(source: &str) -> Result<Self, ron::error::SpannedError> {
        let entries: FxHashMap<String, BlockTextures> = ron::from_str(source)?;
        Ok(Self { entries })
    }

    /// Adds or replaces the entry for `name`.
    pub fn insert(&mut self, name: impl Into<String>, textures: BlockTextures) {
        self.entries.insert(name.into(), textures);
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Textures for a block, falling back to its colours.
    pub fn resolve(&self, name: &str, colors: &FaceColors) -> BlockTextures {
        self.entries
            .get(name)
            .cloned()
            .unwrap_or_else(|| BlockTextures::from_colors(colors))
    }

    /// Recipes for the standard palette.
    pub fn standard() -> Self {
        use TexturePattern::*;

        const STONE_GRAY: Rgb = [127, 127, 127];
        const DIRT: Rgb = [139, 105, 20];
        const BARK: Rgb = [74, 55, 40];
        const RINGS: Rgb = [188, 152, 98];
        const PLANK: Rgb = [188, 152, 98];
        const CHEST_WOOD: Rgb = [135, 95, 38];

        let r = TextureRecipe::new;
        let mottled = |scale, variance, color| r(Mottled { scale, variance }, color);
        let speckle = |variance, color| r(Speckle { variance }, color);
        let ore = |spot, spots| r(Ore { spot, spots }, STONE_GRAY);
        let log = || BlockTextures::TopSideBottom {
            top: r(LogRings { bark: BARK }, RINGS),
            side: r(Bark, BARK),
            bottom: r(LogRings { bark: BARK }, RINGS),
            front: None,
        };
        let stone = mottled(0.3, 10, STONE_GRAY);
        let planks = r(Planks, PLANK);

        let table: Vec<(&str, BlockTextures)> = vec![
            (
                "grass",
                BlockTextures::TopSideBottom {
                    top: mottled(0.3, 6, [122, 182, 72]),
                    side: r(
                        GrassSide {
                            grass: [122, 182, 72],
                        },
                        DIRT,
                    ),
                    bottom: mottled(0.35, 12, DIRT),
                    front: None,
                },
            ),
            ("dirt", BlockTextures::Uniform(mottled(0.35, 12, DIRT))),
            ("stone", BlockTextures::Uniform(stone)),
            (
                "cobblestone",
                BlockTextures::Uniform(mottled(0.6, 14, [111, 111, 111])),
            ),
            ("wood", log()),
            ("log", log()),
            ("leaves", BlockTextures::Uniform(r(Leaves, [45, 90, 39]))),
            ("sand", BlockTextures::Uniform(speckle(8, [232, 212, 168]))),
            (
                "water",
                BlockTextures::Uniform(r(Water, [51, 102, 204]).with_opacity(180)),
            ),
            (
                "glass",
                BlockTextures::Uniform(r(
                    Glass {
                        frame: [220, 232, 245],
                    },
                    [192, 224, 255],
                )),
            ),
            (
                "brick",
                BlockTextures::Uniform(r(
                    Bricks {
                        mortar: [180, 170, 160],
                    },
                    [139, 69, 50],
                )),
            ),
            ("planks", BlockTextures::Uniform(planks)),
            ("snow", BlockTextures::Uniform(speckle(4, [240, 240, 240]))),
            (
                "ice",
                BlockTextures::Uniform(mottled(0.2, 6, [160, 208, 255]).with_opacity(200)),
            ),
            ("clay", BlockTextures::Uniform(speckle(6, [158, 164, 176]))),
            (
                "gravel",
                BlockTextures::Uniform(mottled(0.8, 20, [138, 122, 122])),
            ),
            ("coal_ore", BlockTextures::Uniform(ore([38, 38, 38], 10))),
            ("iron_ore", BlockTextures::Uniform(ore([205, 175, 155], 8))),
            ("gold_ore", BlockTextures::Uniform(ore([245, 225, 75], 7))),
            ("diamond_ore", BlockTextures::Uniform(ore([85, 215, 210], 6))),
            ("bedrock", BlockTextures::Uniform(mottled(0.9, 30, [51, 51, 51]))),
            ("lava", BlockTextures::Uniform(mottled(0.25, 20, [255, 102, 0]))),
            ("cactus", BlockTextures::Uniform(r(Bark, [26, 92, 26]))),
            (
                "crafting_table",
                BlockTextures::TopSideBottom {
                    top: r(CraftingGrid { grid: [70, 48, 24] }, PLANK),
                    side: planks,
                    bottom: planks,
                    front: None,
                },
            ),
            (
                "furnace",
                BlockTextures::TopSideBottom {
                    top: stone,
                    side: stone,
                    bottom: stone,
                    front: Some(r(
                        FurnaceFront {
                            fire: [255, 140, 0],
                        },
                        STONE_GRAY,
                    )),
                },
            ),
            (
                "chest",
                BlockTextures::TopSideBottom {
                    top: planks,
                    side: speckle(12, CHEST_WOOD),
                    bottom: planks,
                    front: Some(r(
                        ChestFront {
                            latch: [75, 75, 85],
                        },
                        CHEST_WOOD,
                    )),
                },
            ),
            ("tnt", BlockTextures::Uniform(speckle(10, [255, 0, 0]))),
            (
                "obsidian",
                BlockTextures::Uniform(mottled(0.5, 8, [26, 10, 46])),
            ),
            (
                "glowstone",
                BlockTextures::Uniform(mottled(0.7, 30, [255, 204, 102])),
            ),
        ];

        let mut book = Self::new();
        for (name, textures) in table {
            book.insert(name, textures);
        }
        book
    }
}
