//! # Terrain Module
//!
//! Deterministic height-map terrain. A 2D fractal Perlin field gives the
//! surface height of every `(x, y)` column; `classify_voxel` turns a voxel's
//! position relative to that height into a material.
//!
//! The generator holds nothing but its immutable noise source, so one instance
//! is shared by every worker thread behind an `Arc`.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::{block::block_type::BlockType, coordinates::VoxelPosition};

/// Maximum world height in voxels. Surface heights fall in `[0, WORLD_HEIGHT - 1]`.
pub const WORLD_HEIGHT: i32 = 32;

/// Heights at or above this get a snow surface.
pub const SNOW_LINE: i32 = 20;
/// Heights at or above this are stone all the way down.
pub const STONE_LINE: i32 = 15;
/// Heights at or above this get grass over dirt; below it the column is sand.
pub const GRASS_LINE: i32 = 6;
/// Voxels below this z are always stone when under the surface.
pub const SEA_FLOOR: i32 = 2;

/// Parameters of the fractal noise field behind the height map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// World units per unit of noise input; larger means broader features.
    pub scale: f64,
    /// Number of Perlin octaves summed.
    pub octaves: usize,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Seed of the permutation table.
    pub seed: u32,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            scale: 120.0,
            octaves: 5,
            persistence: 0.45,
            lacunarity: 2.0,
            seed: 0,
        }
    }
}

/// Maps world columns to surface heights and voxels to materials.
pub struct TerrainGenerator {
    parameters: NoiseParameters,
    noise: Fbm<Perlin>,
}

impl TerrainGenerator {
    /// Builds a generator for the given noise parameters.
    pub fn new(parameters: NoiseParameters) -> Self {
        let noise = Fbm::<Perlin>::new(parameters.seed)
            .set_octaves(parameters.octaves.max(1))
            .set_frequency(1.0)
            .set_persistence(parameters.persistence)
            .set_lacunarity(parameters.lacunarity);

        Self { parameters, noise }
    }

    /// The parameters this generator was built with.
    pub fn parameters(&self) -> &NoiseParameters {
        &self.parameters
    }

    /// Surface height of the column at `(world_x, world_y)`, in `[0, WORLD_HEIGHT - 1]`.
    pub fn height_at(&self, world_x: i32, world_y: i32) -> i32 {
        let raw = self.noise.get([
            world_x as f64 / self.parameters.scale,
            world_y as f64 / self.parameters.scale,
        ]);
        let normalized = ((raw + 1.0) * 0.5).clamp(0.0, 1.0);
        (normalized * (WORLD_HEIGHT - 1) as f64) as i32
    }

    /// What the generator naturally places at `voxel`, ignoring edits.
    ///
    /// Only chunk layers inside `[0, WORLD_HEIGHT)` are ever generated, so any
    /// voxel outside that band is naturally air.
    pub fn natural_block(&self, voxel: VoxelPosition) -> Option<BlockType> {
        if !(0..WORLD_HEIGHT).contains(&voxel.z) {
            return None;
        }
        let height = self.height_at(voxel.x, voxel.y);
        classify_voxel(voxel.x, voxel.y, voxel.z, height)
    }
}

/// Material of the voxel at `world_z` in a column whose surface is at `height`.
///
/// `None` means air. The rules are checked in order: above the surface is air,
/// the surface itself depends on the height band, and below the surface the sea
/// floor rule (`world_z < SEA_FLOOR`) wins over the height bands.
pub fn classify_voxel(_world_x: i32, _world_y: i32, world_z: i32, height: i32) -> Option<BlockType> {
    if world_z > height {
        return None;
    }

    if world_z == height {
        return Some(if height >= SNOW_LINE {
            BlockType::SNOW
        } else if height >= STONE_LINE {
            BlockType::STONE
        } else if height >= GRASS_LINE {
            BlockType::GRASS
        } else {
            BlockType::SAND
        });
    }

    if world_z < SEA_FLOOR {
        return Some(BlockType::STONE);
    }

    Some(if height >= STONE_LINE {
        BlockType::STONE
    } else if height >= GRASS_LINE {
        BlockType::DIRT
    } else {
        BlockType::SAND
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn height_is_deterministic_and_in_range() {
        let generator = TerrainGenerator::new(NoiseParameters::default());
        let other = TerrainGenerator::new(NoiseParameters::default());

        for x in (-300..300).step_by(37) {
            for y in (-300..300).step_by(41) {
                let height = generator.height_at(x, y);
                assert_eq!(height, generator.height_at(x, y));
                assert_eq!(height, other.height_at(x, y));
                assert!((0..WORLD_HEIGHT).contains(&height));
            }
        }
    }

    #[test]
    fn surface_bands() {
        assert_eq!(classify_voxel(0, 0, 20, 20), Some(BlockType::SNOW));
        assert_eq!(classify_voxel(0, 0, 19, 19), Some(BlockType::STONE));
        assert_eq!(classify_voxel(0, 0, 15, 15), Some(BlockType::STONE));
        assert_eq!(classify_voxel(0, 0, 14, 14), Some(BlockType::GRASS));
        assert_eq!(classify_voxel(0, 0, 6, 6), Some(BlockType::GRASS));
        assert_eq!(classify_voxel(0, 0, 5, 5), Some(BlockType::SAND));
    }

    #[test]
    fn below_surface_bands() {
        assert_eq!(classify_voxel(0, 0, 10, 16), Some(BlockType::STONE));
        assert_eq!(classify_voxel(0, 0, 10, 12), Some(BlockType::DIRT));
        assert_eq!(classify_voxel(0, 0, 3, 5), Some(BlockType::SAND));
    }

    #[test]
    fn sea_floor_is_stone() {
        assert_eq!(classify_voxel(0, 0, -1, 0), Some(BlockType::STONE));
        assert_eq!(classify_voxel(0, 0, 1, 4), Some(BlockType::STONE));
        assert_eq!(classify_voxel(0, 0, 0, 12), Some(BlockType::STONE));
    }

    #[test]
    fn above_surface_is_air() {
        assert_eq!(classify_voxel(0, 0, 6, 5), None);
        assert_eq!(classify_voxel(0, 0, 31, 0), None);
    }

    #[test]
    fn natural_block_respects_world_band() {
        let generator = TerrainGenerator::new(NoiseParameters::default());
        assert_eq!(generator.natural_block(Point3::new(0, 0, -1)), None);
        assert_eq!(generator.natural_block(Point3::new(0, 0, WORLD_HEIGHT)), None);

        let height = generator.height_at(4, 4);
        if height > 0 {
            assert_eq!(generator.natural_block(Point3::new(4, 4, 0)), Some(BlockType::STONE));
        }
        assert_eq!(
            generator.natural_block(Point3::new(4, 4, height)),
            classify_voxel(4, 4, height, height)
        );
    }
}
