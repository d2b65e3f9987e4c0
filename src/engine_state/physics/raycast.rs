use cgmath::{InnerSpace, Point3, Vector3};

use crate::engine_state::voxels::{
    coordinates::{floor_to_voxel, VoxelPosition},
    world::WorldBlockMap,
};

/// First solid voxel along a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayHit {
    /// The solid voxel that stopped the ray
    pub voxel: VoxelPosition,
    /// Outward normal of the face the ray entered through, `last_empty - voxel`.
    /// Zero when the ray started inside the hit voxel.
    pub normal: Vector3<i32>,
    /// The last empty voxel sampled before the hit, the placement candidate
    pub last_empty: Option<VoxelPosition>,
}

/// Marches from `origin` along `direction` in fixed steps.
///
/// Samples `floor(max_distance / step)` points starting at `origin` itself.
/// A zero direction or a non-positive step never hits anything.
///
/// # Returns
/// The first occupied voxel, or `None` if nothing solid lies within reach.
pub fn cast_ray(
    world: &WorldBlockMap,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
    step: f32,
) -> Option<RayHit> {
    if step <= 0.0 || direction.magnitude2() == 0.0 {
        return None;
    }
    let advance = direction.normalize() * step;
    let samples = (max_distance / step).floor().max(0.0) as usize;

    let mut position = origin;
    let mut last_empty: Option<VoxelPosition> = None;
    for _ in 0..samples {
        let voxel = floor_to_voxel(position);
        if world.contains(voxel) {
            let normal = last_empty.map_or(Vector3::new(0, 0, 0), |empty| empty - voxel);
            return Some(RayHit {
                voxel,
                normal,
                last_empty,
            });
        }
        last_empty = Some(voxel);
        position += advance;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn wall() -> WorldBlockMap {
        let mut world = WorldBlockMap::new();
        world.set(Point3::new(3, 0, 0), BlockType::STONE);
        world
    }

    #[test]
    fn ray_hits_the_first_solid_voxel() {
        let hit = cast_ray(
            &wall(),
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
            6.0,
            0.1,
        )
        .unwrap();

        assert_eq!(hit.voxel, Point3::new(3, 0, 0));
        assert_eq!(hit.last_empty, Some(Point3::new(2, 0, 0)));
        assert_eq!(hit.normal, Vector3::new(-1, 0, 0));
    }

    #[test]
    fn direction_length_does_not_change_reach() {
        let hit = cast_ray(
            &wall(),
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(40.0, 0.0, 0.0),
            6.0,
            0.1,
        );
        assert!(hit.is_some());
    }

    #[test]
    fn ray_out_of_reach_misses() {
        let miss = cast_ray(
            &wall(),
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
            2.0,
            0.1,
        );
        assert_eq!(miss, None);

        let miss = cast_ray(
            &wall(),
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(-1.0, 0.0, 0.0),
            6.0,
            0.1,
        );
        assert_eq!(miss, None);
    }

    #[test]
    fn ray_starting_inside_a_block_has_no_normal() {
        let hit = cast_ray(
            &wall(),
            Point3::new(3.5, 0.5, 0.5),
            Vector3::new(0.0, 0.0, 1.0),
            6.0,
            0.1,
        )
        .unwrap();
        assert_eq!(hit.voxel, Point3::new(3, 0, 0));
        assert_eq!(hit.last_empty, None);
        assert_eq!(hit.normal, Vector3::new(0, 0, 0));
    }

    #[test]
    fn degenerate_rays_miss() {
        let world = wall();
        let origin = Point3::new(3.5, 0.5, 0.5);
        assert_eq!(cast_ray(&world, origin, Vector3::new(0.0, 0.0, 0.0), 6.0, 0.1), None);
        assert_eq!(cast_ray(&world, origin, Vector3::new(1.0, 0.0, 0.0), 6.0, 0.0), None);
    }
}
