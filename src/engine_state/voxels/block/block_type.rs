//! # Block Type Module
//!
//! The materials a solid voxel can be made of.

use std::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockTypeSize;

/// Every solid material in the world.
///
/// The discriminants are the ids written to the save file and must never be
/// renumbered. Id 0 is unused and id 255 is reserved for the forced-air
/// sentinel of the edit store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive)]
#[repr(u8)]
#[allow(non_camel_case_types)]
pub enum BlockType {
    /// Subsurface fill under grass.
    DIRT = 1,
    /// Surface of mid-height terrain.
    GRASS = 2,
    /// Mountains, the sea floor, and everything under high terrain.
    STONE = 3,
    /// Surface and fill of low terrain.
    SAND = 4,
    /// Surface of the highest peaks.
    SNOW = 5,
    /// Desert plant block.
    CACTUS = 6,
    /// Transparent building block.
    GLASS = 7,
    /// Sawn oak building block.
    OAK_PLANK = 8,
    /// Oak log.
    OAK = 9,
    /// Tree foliage.
    LEAVE = 10,
    /// Cut stone building block.
    STONE_BRICK = 11,
    /// Alternate grass surface.
    GRASS2 = 12,
}

impl BlockType {
    /// Converts a stored id back into a block type.
    ///
    /// # Returns
    /// `None` for 0, the forced-air sentinel, or any id no material uses.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(id)
    }

    /// The id written to disk for this block type.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// All block types in id order.
    pub fn all() -> [BlockType; 12] {
        [
            BlockType::DIRT,
            BlockType::GRASS,
            BlockType::STONE,
            BlockType::SAND,
            BlockType::SNOW,
            BlockType::CACTUS,
            BlockType::GLASS,
            BlockType::OAK_PLANK,
            BlockType::OAK,
            BlockType::LEAVE,
            BlockType::STONE_BRICK,
            BlockType::GRASS2,
        ]
    }

    /// Lower-case asset name of the material.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::DIRT => "dirt",
            BlockType::GRASS => "grass",
            BlockType::STONE => "stone",
            BlockType::SAND => "sand",
            BlockType::SNOW => "snow",
            BlockType::CACTUS => "cactus",
            BlockType::GLASS => "glass",
            BlockType::OAK_PLANK => "oak_plank",
            BlockType::OAK => "oak",
            BlockType::LEAVE => "leave",
            BlockType::STONE_BRICK => "stone_brick",
            BlockType::GRASS2 => "grass2",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
