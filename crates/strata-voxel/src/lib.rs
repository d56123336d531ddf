//! Block registry, chunk storage with a world-absolute edit overlay, and block interaction.

pub mod blocks;
pub mod chunk;
pub mod coords;
pub mod face;
pub mod interaction;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use chunk::{ChunkError, ChunkGrid};
pub use coords::{ChunkCoord, ChunkDims};
pub use face::FaceDirection;
pub use interaction::{
    ActorBox, BreakOutcome, DEFAULT_RAY_STEP, InteractionResolver, PlaceOutcome, RayHit,
};
pub use registry::{
    BlockAttributes, BlockDef, BlockId, BlockRegistry, DropRule, FaceColors, RegistryError, Rgb,
    Tool, Transparency,
};
pub use snapshot::{BoundarySlab, ChunkSnapshot};
pub use store::{ChunkStore, OverlayEntry};
