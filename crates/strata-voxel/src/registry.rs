//! Block registry: maps compact [`BlockId`] values to immutable [`BlockAttributes`].
//!
//! The registry is built once at startup and shared read-only afterwards. Air is
//! the implicit ID 0: it is never registered, always resolves to a fixed
//! non-solid, fully transparent attribute set, and never produces geometry.
//! IDs that were never registered resolve to a fallback attribute set (opaque,
//! stone-coloured) so corrupt chunk data stays visible instead of crashing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact block-type identifier stored in every chunk cell (2 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    /// Empty space.
    pub const AIR: BlockId = BlockId(0);

    /// Returns `true` for ID 0.
    pub fn is_air(self) -> bool {
        self.0 == 0
    }
}

/// Transparency mode for a block type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transparency {
    /// Fully blocks visibility.
    Opaque,
    /// Partially transparent (water, glass, leaves).
    SemiTransparent,
    /// Completely transparent (air).
    FullyTransparent,
}

/// Tool class required to harvest a block efficiently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Shovel,
    Pickaxe,
    Axe,
    Shears,
    DiamondPickaxe,
}

/// An sRGB colour without alpha.
pub type Rgb = [u8; 3];

/// Base colours for the three face groups of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceColors {
    /// Colour of the +Y face.
    pub top: Rgb,
    /// Colour of the four horizontal faces.
    pub side: Rgb,
    /// Colour of the -Y face.
    pub bottom: Rgb,
}

impl FaceColors {
    /// Same colour on every face.
    pub const fn uniform(color: Rgb) -> Self {
        Self {
            top: color,
            side: color,
            bottom: color,
        }
    }

    /// Returns `true` when all three face groups share one colour.
    pub fn is_uniform(&self) -> bool {
        self.top == self.side && self.side == self.bottom
    }
}

/// What breaking a block yields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropRule {
    /// The block drops itself.
    #[default]
    Itself,
    /// The block drops nothing (glass, ice).
    Nothing,
    /// The block drops a different block type.
    Block(BlockId),
}

/// Declarative description of a block type, as found in palette files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    /// Unique lowercase name (e.g. "stone", "oak_log").
    pub name: String,
    /// Whether actors collide with and rays stop at this block.
    pub solid: bool,
    /// Transparency mode.
    pub transparency: Transparency,
    /// Seconds to break by hand; negative means indestructible.
    pub break_time: f32,
    /// Tool class, if any.
    #[serde(default)]
    pub tool: Option<Tool>,
    /// Drop behaviour.
    #[serde(default)]
    pub drop: DropRule,
    /// Per-face base colours.
    pub colors: FaceColors,
    /// Light emission (0 = none, 15 = max).
    #[serde(default)]
    pub light_level: u8,
    /// Whether the block falls when unsupported.
    #[serde(default)]
    pub gravity: bool,
}

/// Resolved, immutable attributes of a registered block type.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockAttributes {
    /// Unique name.
    pub name: String,
    /// Whether actors collide with and rays stop at this block.
    pub solid: bool,
    /// Transparency mode.
    pub transparency: Transparency,
    /// Seconds to break; negative means indestructible.
    pub break_time: f32,
    /// Tool class, if any.
    pub tool: Option<Tool>,
    /// Block type yielded when broken, or `None`.
    pub drop: Option<BlockId>,
    /// Per-face base colours.
    pub colors: FaceColors,
    /// Light emission, clamped to `0..=15`.
    pub light_level: u8,
    /// Whether the block falls when unsupported.
    pub gravity: bool,
}

impl BlockAttributes {
    /// Returns `true` unless the block is opaque.
    pub fn is_transparent(&self) -> bool {
        self.transparency != Transparency::Opaque
    }

    /// Returns `true` if the block can never be broken.
    pub fn is_indestructible(&self) -> bool {
        self.break_time < 0.0
    }

    fn air() -> Self {
        Self {
            name: "air".to_string(),
            solid: false,
            transparency: Transparency::FullyTransparent,
            break_time: 0.0,
            tool: None,
            drop: None,
            colors: FaceColors::uniform([0, 0, 0]),
            light_level: 0,
            gravity: false,
        }
    }

    fn fallback(break_time: f32) -> Self {
        Self {
            name: "unknown".to_string(),
            solid: true,
            transparency: Transparency::Opaque,
            break_time,
            tool: None,
            drop: None,
            colors: FaceColors::uniform([127, 127, 127]),
            light_level: 0,
            gravity: false,
        }
    }
}

/// Errors that can occur during block registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// The name "air" is reserved for ID 0.
    #[error("block name \"air\" is reserved")]
    ReservedName,
    /// All 65 535 slots have been consumed.
    #[error("block registry is full (max 65535 types)")]
    RegistryFull,
    /// A drop refers to an ID that was never registered.
    #[error("block {block} drops unregistered id {drop}")]
    UnknownDrop {
        /// Name of the offending block.
        block: String,
        /// The dangling ID.
        drop: u16,
    },
    /// A palette file could not be parsed.
    #[error("failed to parse block palette: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`BlockId`] → [`BlockAttributes`] with O(1) lookup by index and by name.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    /// Dense table where `index == BlockId.0`; slot 0 holds the air attributes.
    types: Vec<BlockAttributes>,
    /// Reverse lookup: name → ID.
    name_to_id: HashMap<String, BlockId>,
    /// Returned for IDs that were never registered.
    fallback: BlockAttributes,
}

impl BlockRegistry {
    /// Creates an empty registry (only the implicit air type).
    pub fn new() -> Self {
        Self {
            types: vec![BlockAttributes::air()],
            name_to_id: HashMap::new(),
            fallback: BlockAttributes::fallback(1.0),
        }
    }

    /// Builds a registry from a list of definitions, assigning IDs 1, 2, 3...
    /// in order and validating every drop reference.
    pub fn from_defs(defs: impl IntoIterator<Item = BlockDef>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for def in defs {
            registry.register(def)?;
        }
        registry.validate_drops()?;
        Ok(registry)
    }

    /// Parses a RON list of [`BlockDef`]s and builds a registry from it.
    pub fn from_ron_str(source: &str) -> Result<Self, RegistryError> {
        let defs: Vec<BlockDef> = ron::from_str(source)?;
        Self::from_defs(defs)
    }

    /// Registers a new block type and returns its assigned ID.
    ///
    /// IDs are assigned sequentially starting from 1 (0 is air).
    pub fn register(&mut self, def: BlockDef) -> Result<BlockId, RegistryError> {
        if def.name == "air" {
            return Err(RegistryError::ReservedName);
        }
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.types.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockId(self.types.len() as u16);
        let drop = match def.drop {
            DropRule::Itself => Some(id),
            DropRule::Nothing => None,
            DropRule::Block(other) => Some(other),
        };
        self.name_to_id.insert(def.name.clone(), id);
        self.types.push(BlockAttributes {
            name: def.name,
            solid: def.solid,
            transparency: def.transparency,
            break_time: def.break_time,
            tool: def.tool,
            drop,
            colors: def.colors,
            light_level: def.light_level.min(15),
            gravity: def.gravity,
        });
        self.fallback.break_time = self.average_break_time();
        Ok(id)
    }

    /// Returns the attributes for `id`.
    ///
    /// Air resolves to the fixed air attributes; unregistered IDs resolve to
    /// the fallback set (opaque, solid, average break time).
    pub fn lookup(&self, id: BlockId) -> &BlockAttributes {
        match self.types.get(id.0 as usize) {
            Some(attrs) => attrs,
            None => {
                tracing::debug!("unregistered block id {} resolved to fallback", id.0);
                &self.fallback
            }
        }
    }

    /// Returns the fallback attributes used for unknown IDs.
    pub fn fallback(&self) -> &BlockAttributes {
        &self.fallback
    }

    /// Returns the ID for a named block type, or `None` if not found.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockId> {
        if name == "air" {
            return Some(BlockId::AIR);
        }
        self.name_to_id.get(name).copied()
    }

    /// Returns `true` if `id` was registered. Air is never registered.
    pub fn contains(&self, id: BlockId) -> bool {
        !id.is_air() && (id.0 as usize) < self.types.len()
    }

    /// Number of registered types (air excluded).
    pub fn len(&self) -> usize {
        self.types.len() - 1
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over registered `(id, attributes)` pairs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &BlockAttributes)> {
        self.types
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, attrs)| (BlockId(i as u16), attrs))
    }

    /// Returns `true` if the given block is transparent (fully or semi).
    ///
    /// Air is transparent; unknown IDs use the opaque fallback.
    pub fn is_transparent(&self, id: BlockId) -> bool {
        self.lookup(id).is_transparent()
    }

    /// Mean break time of registered destructible blocks.
    fn average_break_time(&self) -> f32 {
        let (sum, count) = self
            .types
            .iter()
            .skip(1)
            .filter(|attrs| attrs.break_time >= 0.0)
            .fold((0.0_f32, 0_u32), |(sum, count), attrs| {
                (sum + attrs.break_time, count + 1)
            });
        if count == 0 { 1.0 } else { sum / count as f32 }
    }

    fn validate_drops(&self) -> Result<(), RegistryError> {
        for (_, attrs) in self.iter() {
            if let Some(drop) = attrs.drop
                && !self.contains(drop)
            {
                return Err(RegistryError::UnknownDrop {
                    block: attrs.name.clone(),
                    drop: drop.0,
                });
            }
        }
        Ok(())
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
