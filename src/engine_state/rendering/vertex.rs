//! Vertex data structures for voxel meshes.
//!
//! This module defines the vertex format emitted by chunk meshing. The layout
//! is `#[repr(C)]` and `Pod` so a renderer can upload a buffer with
//! `bytemuck::cast_slice` without any conversion step.

use cgmath::{Point3, Vector3};

/// A single mesh vertex.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 32 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Outward unit normal of the face this vertex belongs to
    pub normal: [f32; 3],
    /// UV texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - Corner position in world space
    /// * `normal` - Integer outward normal of the owning face
    /// * `tex_coords` - UV coordinates of the corner
    pub fn new(position: Point3<i32>, normal: Vector3<i32>, tex_coords: [f32; 2]) -> Self {
        Vertex {
            position: [position.x as f32, position.y as f32, position.z as f32],
            normal: [normal.x as f32, normal.y as f32, normal.z as f32],
            tex_coords,
        }
    }

    /// Distance in bytes between consecutive vertices in a buffer.
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 32);

        let vertices = [
            Vertex::new(Point3::new(1, 2, 3), Vector3::new(0, 0, 1), [0.0, 1.0]),
            Vertex::new(Point3::new(4, 5, 6), Vector3::new(0, -1, 0), [1.0, 0.0]),
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 2 * Vertex::STRIDE);

        let floats: &[f32] = bytemuck::cast_slice(&vertices);
        assert_eq!(&floats[0..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&floats[3..6], &[0.0, 0.0, 1.0]);
        assert_eq!(&floats[8..11], &[4.0, 5.0, 6.0]);
        assert_eq!(&floats[11..14], &[0.0, -1.0, 0.0]);
    }
}
