//! Meshes currently handed to the renderer, one entry per resident chunk.
//!
//! Installing a mesh replaces the previous `Arc` in a single map write, so a
//! reader always sees either the old complete mesh or the new complete mesh.
//! The old buffers live on until the last reader drops its handle.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use strata_mesh::ChunkMeshes;
use strata_voxel::ChunkCoord;

#[derive(Clone, Debug)]
struct ResidentMesh {
    meshes: Arc<ChunkMeshes>,
    version: u64,
    triangles: usize,
}

/// Renderable meshes keyed by chunk, with triangle telemetry.
#[derive(Debug, Default)]
pub struct MeshStore {
    entries: FxHashMap<ChunkCoord, ResidentMesh>,
    total_triangles: usize,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the meshes built from `version`, returning the ones replaced.
    pub fn install(
        &mut self,
        coord: ChunkCoord,
        version: u64,
        meshes: ChunkMeshes,
    ) -> Option<Arc<ChunkMeshes>> {
        let triangles = meshes.triangle_count();
        let entry = ResidentMesh {
            meshes: Arc::new(meshes),
            version,
            triangles,
        };
        self.total_triangles += triangles;
        let old = self.entries.insert(coord, entry)?;
        self.total_triangles -= old.triangles;
        Some(old.meshes)
    }

    /// Releases a chunk's meshes.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Arc<ChunkMeshes>> {
        let old = self.entries.remove(&coord)?;
        self.total_triangles -= old.triangles;
        Some(old.meshes)
    }

    /// Shared handle to a chunk's current meshes.
    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<ChunkMeshes>> {
        self.entries.get(&coord).map(|e| Arc::clone(&e.meshes))
    }

    /// Chunk version the installed meshes were built from.
    pub fn version(&self, coord: ChunkCoord) -> Option<u64> {
        self.entries.get(&coord).map(|e| e.version)
    }

    /// Triangle count of one chunk.
    pub fn triangles(&self, coord: ChunkCoord) -> Option<usize> {
        self.entries.get(&coord).map(|e| e.triangles)
    }

    /// Triangles across every installed mesh.
    pub fn total_triangles(&self) -> usize {
        self.total_triangles
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Coordinates with an installed mesh.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.entries.keys().copied()
    }

    /// Iterates `(coord, meshes)` for drawing. Empty meshes are skipped.
    pub fn drawable(&self) -> impl Iterator<Item = (ChunkCoord, &ChunkMeshes)> + '_ {
        self.entries
            .iter()
            .filter(|(_, e)| !e.meshes.is_empty())
            .map(|(coord, e)| (*coord, e.meshes.as_ref()))
    }
}
