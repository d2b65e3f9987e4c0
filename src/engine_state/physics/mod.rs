//! # Physics Module
//!
//! Occupancy queries against the world map: probe-corner collision, axis
//! separated movement, and the fixed-step targeting ray. None of this is a
//! continuous collision solver; every test is a handful of voxel lookups.

pub mod collision;
pub mod raycast;

pub use collision::{is_obstructed, resolve_movement, CollisionProbe, Movement};
pub use raycast::{cast_ray, RayHit};
