//! The standard block palette: 29 classic block types with fixed IDs.

use crate::registry::{
    BlockDef, BlockId, BlockRegistry, DropRule, FaceColors, Rgb, Tool, Transparency,
};

pub const GRASS: BlockId = BlockId(1);
pub const DIRT: BlockId = BlockId(2);
pub const STONE: BlockId = BlockId(3);
pub const COBBLESTONE: BlockId = BlockId(4);
pub const WOOD: BlockId = BlockId(5);
pub const LEAVES: BlockId = BlockId(6);
pub const SAND: BlockId = BlockId(7);
pub const WATER: BlockId = BlockId(8);
pub const GLASS: BlockId = BlockId(9);
pub const BRICK: BlockId = BlockId(10);
pub const PLANKS: BlockId = BlockId(11);
pub const LOG: BlockId = BlockId(12);
pub const SNOW: BlockId = BlockId(13);
pub const ICE: BlockId = BlockId(14);
pub const CLAY: BlockId = BlockId(15);
pub const GRAVEL: BlockId = BlockId(16);
pub const COAL_ORE: BlockId = BlockId(17);
pub const IRON_ORE: BlockId = BlockId(18);
pub const GOLD_ORE: BlockId = BlockId(19);
pub const DIAMOND_ORE: BlockId = BlockId(20);
pub const BEDROCK: BlockId = BlockId(21);
pub const LAVA: BlockId = BlockId(22);
pub const CACTUS: BlockId = BlockId(23);
pub const CRAFTING_TABLE: BlockId = BlockId(24);
pub const FURNACE: BlockId = BlockId(25);
pub const CHEST: BlockId = BlockId(26);
pub const TNT: BlockId = BlockId(27);
pub const OBSIDIAN: BlockId = BlockId(28);
pub const GLOWSTONE: BlockId = BlockId(29);

const DIRT_BROWN: Rgb = [139, 105, 20];
const BARK: Rgb = [74, 55, 40];
const PLANK: Rgb = [188, 152, 98];

fn opaque(name: &str, break_time: f32, tool: Option<Tool>, colors: FaceColors) -> BlockDef {
    BlockDef {
        name: name.to_string(),
        solid: true,
        transparency: Transparency::Opaque,
        break_time,
        tool,
        drop: DropRule::Itself,
        colors,
        light_level: 0,
        gravity: false,
    }
}

fn translucent(name: &str, solid: bool, break_time: f32, tool: Option<Tool>, color: Rgb) -> BlockDef {
    BlockDef {
        transparency: Transparency::SemiTransparent,
        solid,
        ..opaque(name, break_time, tool, FaceColors::uniform(color))
    }
}

/// Definitions of the standard palette in ID order (grass = 1).
pub fn standard_defs() -> Vec<BlockDef> {
    use FaceColors as C;
    use Tool::*;

    let mut grass = opaque(
        "grass",
        0.6,
        Some(Shovel),
        C {
            top: [122, 182, 72],
            side: DIRT_BROWN,
            bottom: DIRT_BROWN,
        },
    );
    grass.drop = DropRule::Block(DIRT);

    let mut stone = opaque("stone", 1.5, Some(Pickaxe), C::uniform([127, 127, 127]));
    stone.drop = DropRule::Block(COBBLESTONE);

    let mut sand = opaque("sand", 0.5, Some(Shovel), C::uniform([232, 212, 168]));
    sand.gravity = true;

    let mut glass = translucent("glass", true, 0.3, None, [192, 224, 255]);
    glass.drop = DropRule::Nothing;

    let mut ice = translucent("ice", true, 0.5, Some(Pickaxe), [160, 208, 255]);
    ice.drop = DropRule::Nothing;

    let mut gravel = opaque("gravel", 0.6, Some(Shovel), C::uniform([138, 122, 122]));
    gravel.gravity = true;

    let bedrock = opaque("bedrock", -1.0, None, C::uniform([51, 51, 51]));

    let mut lava = translucent("lava", false, 0.0, None, [255, 102, 0]);
    lava.light_level = 15;

    let mut glowstone = opaque("glowstone", 0.3, None, C::uniform([255, 204, 102]));
    glowstone.light_level = 15;

    vec![
        grass,
        opaque("dirt", 0.5, Some(Shovel), C::uniform(DIRT_BROWN)),
        stone,
        opaque("cobblestone", 2.0, Some(Pickaxe), C::uniform([111, 111, 111])),
        opaque(
            "wood",
            2.0,
            Some(Axe),
            C {
                top: [107, 83, 68],
                side: BARK,
                bottom: [107, 83, 68],
            },
        ),
        translucent("leaves", true, 0.2, Some(Shears), [45, 90, 39]),
        sand,
        translucent("water", false, 0.0, None, [51, 102, 204]),
        glass,
        opaque("brick", 2.0, Some(Pickaxe), C::uniform([139, 69, 50])),
        opaque("planks", 2.0, Some(Axe), C::uniform(PLANK)),
        opaque(
            "log",
            2.0,
            Some(Axe),
            C {
                top: PLANK,
                side: BARK,
                bottom: PLANK,
            },
        ),
        opaque("snow", 0.5, Some(Shovel), C::uniform([240, 240, 240])),
        ice,
        opaque("clay", 0.6, Some(Shovel), C::uniform([158, 164, 176])),
        gravel,
        opaque("coal_ore", 3.0, Some(Pickaxe), C::uniform([74, 74, 74])),
        opaque("iron_ore", 3.0, Some(Pickaxe), C::uniform([138, 117, 96])),
        opaque("gold_ore", 3.0, Some(Pickaxe), C::uniform([252, 219, 78])),
        opaque("diamond_ore", 3.0, Some(Pickaxe), C::uniform([92, 214, 232])),
        bedrock,
        lava,
        opaque("cactus", 0.4, None, C::uniform([26, 92, 26])),
        opaque("crafting_table", 2.5, Some(Axe), C::uniform(PLANK)),
        opaque("furnace", 3.5, Some(Pickaxe), C::uniform([127, 127, 127])),
        opaque("chest", 2.5, Some(Axe), C::uniform(DIRT_BROWN)),
        opaque("tnt", 0.0, None, C::uniform([255, 0, 0])),
        opaque("obsidian", 50.0, Some(DiamondPickaxe), C::uniform([26, 10, 46])),
        glowstone,
    ]
}

impl BlockRegistry {
    /// Builds the standard 29-block palette.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for def in standard_defs() {
            // Names in the standard table are unique and drops point at
            // registered IDs, so registration cannot fail here.
            if let Err(err) = registry.register(def) {
                tracing::error!("standard palette rejected: {err}");
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_ids_match_constants() {
        let registry = BlockRegistry::standard();
        assert_eq!(registry.len(), 29);
        assert_eq!(registry.lookup_by_name("grass"), Some(GRASS));
        assert_eq!(registry.lookup_by_name("water"), Some(WATER));
        assert_eq!(registry.lookup_by_name("log"), Some(LOG));
        assert_eq!(registry.lookup_by_name("glowstone"), Some(GLOWSTONE));
    }

    #[test]
    fn test_standard_drops() {
        let registry = BlockRegistry::standard();
        assert_eq!(registry.lookup(GRASS).drop, Some(DIRT));
        assert_eq!(registry.lookup(STONE).drop, Some(COBBLESTONE));
        assert_eq!(registry.lookup(DIRT).drop, Some(DIRT));
        assert_eq!(registry.lookup(GLASS).drop, None);
        assert_eq!(registry.lookup(ICE).drop, None);
    }

    #[test]
    fn test_standard_attributes() {
        let registry = BlockRegistry::standard();
        assert!(registry.lookup(BEDROCK).is_indestructible());
        assert!(!registry.lookup(WATER).solid);
        assert!(registry.lookup(WATER).is_transparent());
        assert!(registry.lookup(LEAVES).solid);
        assert!(registry.lookup(LEAVES).is_transparent());
        assert!(registry.lookup(SAND).gravity);
        assert_eq!(registry.lookup(LAVA).light_level, 15);
        assert_eq!(registry.lookup(OBSIDIAN).tool, Some(Tool::DiamondPickaxe));
    }

    #[test]
    fn test_standard_defs_pass_validation() {
        let registry = BlockRegistry::from_defs(standard_defs()).unwrap();
        assert_eq!(registry.len(), 29);
    }
}
