//! Chunk meshing: face culling, atlas-textured quads, and an asynchronous
//! worker pool that meshes chunk snapshots off the main thread.

pub mod async_mesh;
pub mod builder;
pub mod chunk_mesh;
pub mod invalidation;
pub mod visibility;
pub mod visible_faces;

pub use async_mesh::{
    CancelToken, Mesher, MeshingError, MeshingPipeline, MeshingResult, MeshingTask, SubmitError,
    default_worker_count,
};
pub use builder::{build_chunk_mesh, build_snapshot_mesh};
pub use chunk_mesh::{ChunkMesh, ChunkMeshes, MeshVertex};
pub use invalidation::ChunkMeshState;
pub use visibility::{compute_visible_faces, count_visible_faces, face_visible, visible_faces_at};
pub use visible_faces::VisibleFaces;
