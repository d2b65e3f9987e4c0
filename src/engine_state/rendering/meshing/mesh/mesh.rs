//! Mesh data structures for voxel rendering.
//!
//! A chunk mesh is a set of vertex/index buffers, one per block type, so a
//! renderer can bind each material's texture once and draw its whole batch.
//! Meshes are always rebuilt wholesale; nothing here patches an existing
//! buffer in place.

use std::collections::BTreeMap;

use cgmath::Point3;

use crate::engine_state::{rendering::Vertex, voxels::block::block_type::BlockType};

use super::face::{Face, FACES, FACE_UVS, QUAD_INDICES};

/// Vertex and index data for a single draw batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshBuffers {
    /// The vertex data, four per quad
    pub vertices: Vec<Vertex>,
    /// Triangle indices into `vertices`, six per quad
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Appends one quad for `face` of the voxel at `origin`.
    ///
    /// # Arguments
    /// * `origin` - Minimum corner of the voxel, in the space the buffer is built in
    /// * `face` - Entry of the face table to emit
    pub fn push_face(&mut self, origin: Point3<i32>, face: &Face) {
        let base = self.vertices.len() as u32;
        let normal = face.normal_vector();

        for (corner, uv) in FACE_UVS.iter().enumerate() {
            self.vertices
                .push(Vertex::new(face.corner_at(origin, corner), normal, *uv));
        }
        self.indices
            .extend(QUAD_INDICES.iter().map(|index| base + index));
    }

    /// Number of quads in this batch.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

/// Per-block-type buffers making up one chunk's renderable surface.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mesh {
    buffers: BTreeMap<BlockType, MeshBuffers>,
}

impl Mesh {
    /// Creates a mesh with no buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the six faces of a unit cube at the origin.
    ///
    /// Used for the placement ghost: the caller translates it to the target
    /// voxel. It comes from the same face table as chunk meshes.
    pub fn unit_cube() -> MeshBuffers {
        let mut buffers = MeshBuffers::default();
        for face in &FACES {
            buffers.push_face(Point3::new(0, 0, 0), face);
        }
        buffers
    }

    /// Appends a quad to the batch of `block_type`.
    pub fn push_face(&mut self, block_type: BlockType, origin: Point3<i32>, face: &Face) {
        self.buffers
            .entry(block_type)
            .or_default()
            .push_face(origin, face);
    }

    /// The batch for `block_type`, if any face of that material was emitted.
    pub fn buffers_for(&self, block_type: BlockType) -> Option<&MeshBuffers> {
        self.buffers.get(&block_type)
    }

    /// Iterates every batch in block type order.
    pub fn buffers(&self) -> impl Iterator<Item = (BlockType, &MeshBuffers)> {
        self.buffers.iter().map(|(block_type, buffers)| (*block_type, buffers))
    }

    /// Whether the mesh has no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Total number of quads over all batches.
    pub fn quad_count(&self) -> usize {
        self.buffers.values().map(MeshBuffers::quad_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_side::BlockSide;

    #[test]
    fn unit_cube_has_six_quads() {
        let cube = Mesh::unit_cube();
        assert_eq!(cube.quad_count(), 6);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.indices.iter().all(|index| (*index as usize) < cube.vertices.len()));
    }

    #[test]
    fn faces_are_grouped_by_block_type() {
        let mut mesh = Mesh::new();
        let origin = Point3::new(8, 0, 16);
        mesh.push_face(BlockType::STONE, origin, Face::for_side(BlockSide::TOP));
        mesh.push_face(BlockType::STONE, origin, Face::for_side(BlockSide::EAST));
        mesh.push_face(BlockType::GLASS, origin, Face::for_side(BlockSide::TOP));

        assert_eq!(mesh.quad_count(), 3);
        let stone = mesh.buffers_for(BlockType::STONE).unwrap();
        assert_eq!(stone.quad_count(), 2);
        assert_eq!(&stone.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(mesh.buffers_for(BlockType::GLASS).unwrap().quad_count(), 1);
        assert!(mesh.buffers_for(BlockType::DIRT).is_none());
    }

    #[test]
    fn vertex_positions_are_translated_to_origin() {
        let mut buffers = MeshBuffers::default();
        buffers.push_face(Point3::new(-3, 2, 5), Face::for_side(BlockSide::TOP));

        for vertex in &buffers.vertices {
            assert_eq!(vertex.position[2], 6.0);
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
            assert!(vertex.position[0] == -3.0 || vertex.position[0] == -2.0);
        }
        assert_eq!(buffers.vertices[2].tex_coords, [1.0, 1.0]);
    }
}
