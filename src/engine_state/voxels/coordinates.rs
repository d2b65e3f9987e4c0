//! # Coordinates Module
//!
//! Conversions between the three coordinate spaces of the world:
//!
//! * **voxel** — integer world position of a single unit cube
//! * **chunk** — `floor(voxel / CHUNK_DIMENSION)` per axis
//! * **local** — `voxel mod CHUNK_DIMENSION` per axis, always in `[0, CHUNK_DIMENSION)`
//!
//! Euclidean division keeps negative voxels in the right chunk: voxel `-1`
//! lives in chunk `-1` at local `CHUNK_DIMENSION - 1`.

use cgmath::{Point3, Vector3};

use super::chunk::CHUNK_DIMENSION;

/// Integer world position of a voxel.
pub type VoxelPosition = Point3<i32>;
/// Position of a chunk in chunk coordinates.
pub type ChunkPosition = Point3<i32>;
/// Position of a voxel relative to its chunk's origin.
pub type LocalPosition = Point3<i32>;

/// Chunk containing the given voxel.
pub fn voxel_to_chunk(voxel: VoxelPosition) -> ChunkPosition {
    Point3::new(
        voxel.x.div_euclid(CHUNK_DIMENSION),
        voxel.y.div_euclid(CHUNK_DIMENSION),
        voxel.z.div_euclid(CHUNK_DIMENSION),
    )
}

/// Position of the voxel inside its chunk.
pub fn voxel_to_local(voxel: VoxelPosition) -> LocalPosition {
    Point3::new(
        voxel.x.rem_euclid(CHUNK_DIMENSION),
        voxel.y.rem_euclid(CHUNK_DIMENSION),
        voxel.z.rem_euclid(CHUNK_DIMENSION),
    )
}

/// Splits a voxel position into its chunk and local parts.
pub fn voxel_to_chunk_and_local(voxel: VoxelPosition) -> (ChunkPosition, LocalPosition) {
    (voxel_to_chunk(voxel), voxel_to_local(voxel))
}

/// World position of a local voxel in the given chunk.
pub fn local_to_voxel(chunk: ChunkPosition, local: LocalPosition) -> VoxelPosition {
    Point3::new(
        chunk.x * CHUNK_DIMENSION + local.x,
        chunk.y * CHUNK_DIMENSION + local.y,
        chunk.z * CHUNK_DIMENSION + local.z,
    )
}

/// World position of the chunk's lowest corner voxel.
pub fn chunk_origin(chunk: ChunkPosition) -> VoxelPosition {
    local_to_voxel(chunk, Point3::new(0, 0, 0))
}

/// Whether a local position lies inside a chunk.
pub fn is_local_in_bounds(local: LocalPosition) -> bool {
    (0..CHUNK_DIMENSION).contains(&local.x)
        && (0..CHUNK_DIMENSION).contains(&local.y)
        && (0..CHUNK_DIMENSION).contains(&local.z)
}

/// Chunk containing a floating point world position (an observer's eye, for example).
pub fn world_to_chunk(position: Point3<f32>) -> ChunkPosition {
    voxel_to_chunk(floor_to_voxel(position))
}

/// The voxel a floating point world position falls into.
pub fn floor_to_voxel(position: Point3<f32>) -> VoxelPosition {
    Point3::new(
        position.x.floor() as i32,
        position.y.floor() as i32,
        position.z.floor() as i32,
    )
}

/// The chunk owning `voxel` plus every chunk that shares one of the voxel's faces.
///
/// A voxel on a chunk boundary face is visible from the neighbouring chunk, so
/// both sides need remeshing after an edit. The owning chunk always comes first.
pub fn chunks_touching_voxel(voxel: VoxelPosition) -> Vec<ChunkPosition> {
    let (chunk, local) = voxel_to_chunk_and_local(voxel);
    let mut touching = vec![chunk];

    let axes = [
        (local.x, Vector3::new(1, 0, 0)),
        (local.y, Vector3::new(0, 1, 0)),
        (local.z, Vector3::new(0, 0, 1)),
    ];
    for (coordinate, axis) in axes {
        if coordinate == 0 {
            touching.push(chunk - axis);
        }
        if coordinate == CHUNK_DIMENSION - 1 {
            touching.push(chunk + axis);
        }
    }

    touching
}

/// The six chunks sharing a face with `chunk`.
pub fn face_neighbours(chunk: ChunkPosition) -> [ChunkPosition; 6] {
    [
        chunk + Vector3::new(1, 0, 0),
        chunk + Vector3::new(-1, 0, 0),
        chunk + Vector3::new(0, 1, 0),
        chunk + Vector3::new(0, -1, 0),
        chunk + Vector3::new(0, 0, 1),
        chunk + Vector3::new(0, 0, -1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxel_to_chunk() {
        assert_eq!(voxel_to_chunk(Point3::new(0, 0, 0)), Point3::new(0, 0, 0));
        assert_eq!(voxel_to_chunk(Point3::new(7, 7, 7)), Point3::new(0, 0, 0));
        assert_eq!(voxel_to_chunk(Point3::new(8, 16, 24)), Point3::new(1, 2, 3));

        assert_eq!(voxel_to_chunk(Point3::new(-1, -1, -1)), Point3::new(-1, -1, -1));
        assert_eq!(voxel_to_chunk(Point3::new(-8, -8, -8)), Point3::new(-1, -1, -1));
        assert_eq!(voxel_to_chunk(Point3::new(-9, 0, 0)), Point3::new(-2, 0, 0));
    }

    #[test]
    fn test_voxel_to_local_is_never_negative() {
        assert_eq!(voxel_to_local(Point3::new(-1, -8, -9)), Point3::new(7, 0, 7));
        assert_eq!(voxel_to_local(Point3::new(9, 15, 16)), Point3::new(1, 7, 0));
    }

    #[test]
    fn test_local_round_trip() {
        let voxel = Point3::new(-13, 42, 5);
        let (chunk, local) = voxel_to_chunk_and_local(voxel);
        assert!(is_local_in_bounds(local));
        assert_eq!(local_to_voxel(chunk, local), voxel);
    }

    #[test]
    fn test_world_to_chunk_floors() {
        assert_eq!(world_to_chunk(Point3::new(-0.5, 7.9, 8.0)), Point3::new(-1, 0, 1));
    }

    #[test]
    fn test_interior_voxel_touches_only_its_chunk() {
        assert_eq!(chunks_touching_voxel(Point3::new(3, 4, 5)), vec![Point3::new(0, 0, 0)]);
    }

    #[test]
    fn test_boundary_voxel_touches_neighbours() {
        let touching = chunks_touching_voxel(Point3::new(8, 15, 3));
        assert_eq!(touching[0], Point3::new(1, 1, 0));
        assert!(touching.contains(&Point3::new(0, 1, 0)));
        assert!(touching.contains(&Point3::new(1, 2, 0)));
        assert_eq!(touching.len(), 3);
    }
}
