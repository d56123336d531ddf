//! Chunk streaming: keeps a disc of chunks around the viewpoint generated,
//! meshed off-thread, and evicted once they fall out of range.

pub mod generator;
pub mod load_queue;
pub mod mesh_store;
pub mod streamer;

pub use generator::{FlatGenerator, HeightmapGenerator, HeightmapParams, TerrainGenerator};
pub use load_queue::ChunkLoadQueue;
pub use mesh_store::MeshStore;
pub use streamer::{ChunkState, ChunkStreamer, StreamConfig, StreamTickResult};
