//! # Block Side Module
//!
//! The six faces of a voxel. The world is Z-up: `TOP` faces `+Z`.

use cgmath::Vector3;

/// One face of a unit voxel, in the order of the shared face table.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing positive Y.
    NORTH = 0,
    /// Facing negative Y.
    SOUTH = 1,
    /// Facing negative X.
    WEST = 2,
    /// Facing positive X.
    EAST = 3,
    /// Facing positive Z.
    TOP = 4,
    /// Facing negative Z.
    BOTTOM = 5,
}

impl BlockSide {
    /// Outward unit normal of this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::NORTH => Vector3::new(0, 1, 0),
            BlockSide::SOUTH => Vector3::new(0, -1, 0),
            BlockSide::WEST => Vector3::new(-1, 0, 0),
            BlockSide::EAST => Vector3::new(1, 0, 0),
            BlockSide::TOP => Vector3::new(0, 0, 1),
            BlockSide::BOTTOM => Vector3::new(0, 0, -1),
        }
    }
}
