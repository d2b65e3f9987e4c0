use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::block_side::BlockSide;

/// One face of the unit cube: its side, outward normal and four corners.
///
/// Corners are offsets inside the unit cube `[0, 1]³`, ordered so that the
/// triangles `(0, 1, 2)` and `(0, 2, 3)` wind counter-clockwise when seen
/// from outside the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Which side of the block this face represents
    pub side: BlockSide,
    /// Outward normal
    pub normal: [i32; 3],
    /// Corner offsets in unit-cube space
    pub corners: [[i32; 3]; 4],
}

/// The face table shared by chunk meshing and the ghost preview.
pub const FACES: [Face; 6] = [
    Face {
        side: BlockSide::NORTH,
        normal: [0, 1, 0],
        corners: [[1, 1, 0], [0, 1, 0], [0, 1, 1], [1, 1, 1]],
    },
    Face {
        side: BlockSide::SOUTH,
        normal: [0, -1, 0],
        corners: [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
    },
    Face {
        side: BlockSide::WEST,
        normal: [-1, 0, 0],
        corners: [[0, 1, 0], [0, 0, 0], [0, 0, 1], [0, 1, 1]],
    },
    Face {
        side: BlockSide::EAST,
        normal: [1, 0, 0],
        corners: [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]],
    },
    Face {
        side: BlockSide::TOP,
        normal: [0, 0, 1],
        corners: [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
    },
    Face {
        side: BlockSide::BOTTOM,
        normal: [0, 0, -1],
        corners: [[0, 1, 0], [1, 1, 0], [1, 0, 0], [0, 0, 0]],
    },
];

/// UV coordinates of the four corners, in corner order.
pub const FACE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Local index pattern of the two triangles of a quad.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

impl Face {
    /// Looks up the table entry for `side`.
    pub fn for_side(side: BlockSide) -> &'static Face {
        &FACES[side as usize]
    }

    /// Outward normal as a vector.
    pub fn normal_vector(&self) -> Vector3<i32> {
        Vector3::from(self.normal)
    }

    /// Corner `index` translated to the voxel at `origin`.
    pub fn corner_at(&self, origin: Point3<i32>, index: usize) -> Point3<i32> {
        let [x, y, z] = self.corners[index];
        Point3::new(origin.x + x, origin.y + y, origin.z + z)
    }
}
