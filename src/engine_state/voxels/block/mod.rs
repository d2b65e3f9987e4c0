//! # Block Module
//!
//! Block materials and the six faces of a voxel.
//!
//! Air is never stored: a voxel with no entry is air. The only place an "air"
//! value exists is the edit store, where it records a forced-air edit.

use phf::phf_map;

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types on disk and in memory.
pub type BlockTypeSize = u8;

/// Texture asset for each block type, keyed by its numeric id.
///
/// The renderer binds one texture per block-type buffer of a chunk mesh.
pub static BLOCK_TEXTURES: phf::Map<BlockTypeSize, &'static str> = phf_map! {
    1u8 => "assets/dirt.jpg",
    2u8 => "assets/grass.jpg",
    3u8 => "assets/stone.png",
    4u8 => "assets/sand.png",
    5u8 => "assets/snow.png",
    6u8 => "assets/cactus.png",
    7u8 => "assets/glass.png",
    8u8 => "assets/oak_plank.png",
    9u8 => "assets/oak.png",
    10u8 => "assets/leave.png",
    11u8 => "assets/stone_brick.png",
    12u8 => "assets/grass2.png",
};

impl BlockType {
    /// Path of the texture the renderer should bind for this block type.
    pub fn texture_path(self) -> &'static str {
        BLOCK_TEXTURES
            .get(&(self as BlockTypeSize))
            .copied()
            .unwrap_or("assets/missing.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_block_type_has_a_texture() {
        for block_type in BlockType::all() {
            assert!(BLOCK_TEXTURES.contains_key(&(block_type as BlockTypeSize)));
            assert!(block_type.texture_path().contains(block_type.name()));
        }
    }
}
