//! Chunk mesh buffers: GPU-ready vertices and triangle indices.

use strata_voxel::FaceDirection;

/// A single vertex in a chunk mesh.
///
/// Layout (36 bytes): position, normal, atlas UV, flat face light.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Position in chunk-local block units.
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
    /// Atlas texture coordinates, top-left origin.
    pub uv: [f32; 2],
    /// Per-face brightness multiplier.
    pub light: f32,
}

static_assertions::assert_eq_size!(MeshVertex, [u8; 36]);

/// Unit-cube corner offsets per face, counter-clockwise seen from outside.
///
/// Side faces list their two bottom corners first, so corners 2 and 3 are
/// the top edge.
fn face_corners(face: FaceDirection) -> [[f32; 3]; 4] {
    match face {
        FaceDirection::PosY => [[0., 1., 0.], [0., 1., 1.], [1., 1., 1.], [1., 1., 0.]],
        FaceDirection::NegY => [[0., 0., 1.], [0., 0., 0.], [1., 0., 0.], [1., 0., 1.]],
        FaceDirection::PosZ => [[0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.]],
        FaceDirection::NegZ => [[1., 0., 0.], [0., 0., 0.], [0., 1., 0.], [1., 1., 0.]],
        FaceDirection::PosX => [[1., 0., 1.], [1., 0., 0.], [1., 1., 0.], [1., 1., 1.]],
        FaceDirection::NegX => [[0., 0., 0.], [0., 0., 1.], [0., 1., 1.], [0., 1., 0.]],
    }
}

/// Cell-relative UV for each corner (`v = 0` is the cell's top row).
fn face_uv_corners(face: FaceDirection) -> [[f32; 2]; 4] {
    match face {
        FaceDirection::PosY => [[0., 0.], [0., 1.], [1., 1.], [1., 0.]],
        FaceDirection::NegY => [[0., 1.], [0., 0.], [1., 0.], [1., 1.]],
        _ => [[0., 1.], [1., 1.], [1., 0.], [0., 0.]],
    }
}

/// Triangle list for one material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one unit face of the block at chunk-local `(x, y, z)`.
    ///
    /// `uv_min`/`uv_max` is the atlas rect for the face's texture.
    pub fn push_face(
        &mut self,
        face: FaceDirection,
        (x, y, z): (usize, usize, usize),
        uv_min: [f32; 2],
        uv_max: [f32; 2],
    ) {
        let base = self.vertices.len() as u32;
        let normal = face.normal();
        let light = face.light_factor();
        let origin = [x as f32, y as f32, z as f32];
        let size = [uv_max[0] - uv_min[0], uv_max[1] - uv_min[1]];

        for (corner, local_uv) in face_corners(face).iter().zip(face_uv_corners(face)) {
            self.vertices.push(MeshVertex {
                position: [
                    origin[0] + corner[0],
                    origin[1] + corner[1],
                    origin[2] + corner[2],
                ],
                normal,
                uv: [
                    uv_min[0] + local_uv[0] * size[0],
                    uv_min[1] + local_uv[1] * size[1],
                ],
                light,
            });
        }

        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Number of faces (quads) in the mesh.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw vertex bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Counts faces whose normal matches `face`.
    pub fn count_faces_for_direction(&self, face: FaceDirection) -> usize {
        let normal = face.normal();
        self.vertices
            .chunks_exact(4)
            .filter(|quad| quad[0].normal == normal)
            .count()
    }
}

/// The opaque and translucent meshes of one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMeshes {
    /// Faces of opaque blocks.
    pub opaque: ChunkMesh,
    /// Faces of transparent blocks (water, glass, leaves).
    pub translucent: ChunkMesh,
}

impl ChunkMeshes {
    /// Total faces across both meshes.
    pub fn face_count(&self) -> usize {
        self.opaque.face_count() + self.translucent.face_count()
    }

    /// Total triangles across both meshes.
    pub fn triangle_count(&self) -> usize {
        self.opaque.triangle_count() + self.translucent.triangle_count()
    }

    /// Returns `true` if neither mesh has geometry.
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.translucent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn tri_normal(mesh: &ChunkMesh, tri: usize) -> Vec3 {
        let p = |i: usize| Vec3::from(mesh.vertices[mesh.indices[tri * 3 + i] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0)).normalize()
    }

    #[test]
    fn test_every_face_is_ccw_from_outside() {
        for face in FaceDirection::ALL {
            let mut mesh = ChunkMesh::new();
            mesh.push_face(face, (0, 0, 0), [0.0, 0.0], [1.0, 1.0]);
            let expected = Vec3::from(face.normal());
            for tri in 0..2 {
                let n = tri_normal(&mesh, tri);
                assert!(
                    (n - expected).length() < 1e-5,
                    "{face:?} triangle {tri} faces {n}"
                );
            }
        }
    }

    #[test]
    fn test_face_corners_lie_on_face_plane() {
        for face in FaceDirection::ALL {
            let mut mesh = ChunkMesh::new();
            mesh.push_face(face, (2, 3, 4), [0.0, 0.0], [1.0, 1.0]);
            let center = Vec3::new(2.5, 3.5, 4.5);
            let normal = Vec3::from(face.normal());
            for v in &mesh.vertices {
                let offset = Vec3::from(v.position) - center;
                assert!((offset.dot(normal) - 0.5).abs() < 1e-6);
                assert_eq!(v.normal, face.normal());
                assert_eq!(v.light, face.light_factor());
            }
        }
    }

    #[test]
    fn test_side_top_edge_maps_to_uv_min_v() {
        let (uv_min, uv_max) = ([0.25, 0.5], [0.5, 0.75]);
        for face in FaceDirection::HORIZONTAL {
            let mut mesh = ChunkMesh::new();
            mesh.push_face(face, (0, 0, 0), uv_min, uv_max);
            for v in &mesh.vertices {
                let expected_v = if v.position[1] > 0.5 { uv_min[1] } else { uv_max[1] };
                assert_eq!(v.uv[1], expected_v, "{face:?}");
                assert!(v.uv[0] >= uv_min[0] && v.uv[0] <= uv_max[0]);
            }
        }
    }

    #[test]
    fn test_counts_and_bytes() {
        let mut mesh = ChunkMesh::new();
        assert!(mesh.is_empty());
        mesh.push_face(FaceDirection::PosY, (0, 0, 0), [0.0, 0.0], [1.0, 1.0]);
        mesh.push_face(FaceDirection::NegX, (0, 0, 0), [0.0, 0.0], [1.0, 1.0]);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.vertex_bytes().len(), 8 * 36);
        assert_eq!(mesh.index_bytes().len(), 12 * 4);
        assert_eq!(mesh.count_faces_for_direction(FaceDirection::PosY), 1);
    }
}
