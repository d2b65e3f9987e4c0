use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::world::WorldBlockMap;

/// Shape of the observer's collision probe.
///
/// The probe is sampled at the four horizontal corners `(±half_extent,
/// ±half_extent)` and at two heights, `0` and `height`, above the probe
/// position. `vertical_bias` is added to every floored sample height; the
/// default of `-3` places the feet three voxels below the eye.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionProbe {
    /// Half the horizontal width of the probe
    pub half_extent: f32,
    /// Vertical distance between the two sample heights
    pub height: f32,
    /// Voxel offset applied to every vertical sample
    pub vertical_bias: f32,
}

impl Default for CollisionProbe {
    fn default() -> Self {
        CollisionProbe {
            half_extent: 0.4,
            height: 1.75,
            vertical_bias: -3.0,
        }
    }
}

impl CollisionProbe {
    /// The eight voxels sampled for a probe at `center`.
    pub fn sample_voxels(&self, center: Point3<f32>) -> [Point3<i32>; 8] {
        let mut samples = [Point3::new(0, 0, 0); 8];
        let mut index = 0;
        for dx in [-self.half_extent, self.half_extent] {
            for dy in [-self.half_extent, self.half_extent] {
                for dz in [0.0, self.height] {
                    samples[index] = Point3::new(
                        (center.x + dx).floor() as i32,
                        (center.y + dy).floor() as i32,
                        ((center.z + dz).floor() + self.vertical_bias).floor() as i32,
                    );
                    index += 1;
                }
            }
        }
        samples
    }
}

/// Whether any sample voxel of the probe at `center` is solid.
pub fn is_obstructed(world: &WorldBlockMap, center: Point3<f32>, probe: &CollisionProbe) -> bool {
    probe
        .sample_voxels(center)
        .iter()
        .any(|voxel| world.contains(*voxel))
}

/// Result of [`resolve_movement`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    /// Where the probe ended up
    pub position: Point3<f32>,
    /// The horizontal part of the displacement was refused
    pub blocked_horizontal: bool,
    /// The vertical part of the displacement was refused
    pub blocked_vertical: bool,
}

/// Moves a probe by `displacement`, one axis group at a time.
///
/// The horizontal displacement is applied first and kept only if the probe is
/// free at the target. The vertical displacement is then tried from wherever
/// the horizontal step left the probe.
pub fn resolve_movement(
    world: &WorldBlockMap,
    position: Point3<f32>,
    displacement: Vector3<f32>,
    probe: &CollisionProbe,
) -> Movement {
    let mut resolved = position;

    let horizontal = Point3::new(position.x + displacement.x, position.y + displacement.y, position.z);
    let blocked_horizontal = is_obstructed(world, horizontal, probe);
    if !blocked_horizontal {
        resolved = horizontal;
    }

    let vertical = Point3::new(resolved.x, resolved.y, resolved.z + displacement.z);
    let blocked_vertical = is_obstructed(world, vertical, probe);
    if !blocked_vertical {
        resolved = vertical;
    }

    Movement {
        position: resolved,
        blocked_horizontal,
        blocked_vertical,
    }
}
