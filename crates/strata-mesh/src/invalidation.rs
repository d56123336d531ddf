//! Mesh cache bookkeeping: which resident chunks have stale meshes.
//!
//! Chunk versions come from [`ChunkStore`](strata_voxel::ChunkStore) and are
//! bumped on every install and on every edit that touches the chunk or its
//! border. A mesh is current when it was built from the version now stored.

/// Metadata for a chunk's mesh cache state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkMeshState {
    /// Version of the block data the current mesh was built from.
    /// `0` means no mesh has been built yet; store versions start at 1.
    pub meshed_version: u64,
    /// Whether a remesh task is already in flight for this chunk.
    pub remesh_pending: bool,
}

impl ChunkMeshState {
    /// Creates a new mesh state with no mesh generated yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the mesh is stale (version mismatch with current data).
    pub fn is_stale(&self, current_data_version: u64) -> bool {
        self.meshed_version != current_data_version
    }

    /// Returns `true` if this chunk needs a remesh task submitted.
    pub fn needs_remesh(&self, current_data_version: u64) -> bool {
        self.is_stale(current_data_version) && !self.remesh_pending
    }

    /// Records that a remesh task was handed to the workers.
    pub fn mark_submitted(&mut self) {
        self.remesh_pending = true;
    }

    /// Records a finished mesh built from `version`.
    pub fn mark_meshed(&mut self, version: u64) {
        self.meshed_version = version;
        self.remesh_pending = false;
    }

    /// Forgets an in-flight task that will never report back.
    pub fn clear_pending(&mut self) {
        self.remesh_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_needs_mesh() {
        let state = ChunkMeshState::new();
        assert!(state.is_stale(1));
        assert!(state.needs_remesh(1));
    }

    #[test]
    fn test_version_mismatch_triggers_remesh() {
        let mut state = ChunkMeshState {
            meshed_version: 1,
            remesh_pending: false,
        };

        assert!(state.is_stale(2));
        assert!(state.needs_remesh(2));

        state.mark_meshed(2);
        assert!(!state.is_stale(2));
        assert!(!state.needs_remesh(2));
    }

    #[test]
    fn test_pending_remesh_suppresses_resubmit() {
        let mut state = ChunkMeshState::new();
        state.mark_submitted();
        assert!(state.is_stale(3));
        assert!(!state.needs_remesh(3));

        state.clear_pending();
        assert!(state.needs_remesh(3));
    }

    #[test]
    fn test_result_for_older_version_stays_stale() {
        let mut state = ChunkMeshState::new();
        state.mark_submitted();
        // Edited to version 5 while the task for version 4 was running.
        state.mark_meshed(4);
        assert!(state.needs_remesh(5));
    }
}
