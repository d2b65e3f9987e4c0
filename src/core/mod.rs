//! # Core Module
//!
//! Ownership primitives shared by the engine subsystems.
//!
//! All world mutation happens on a single owning thread, so the engine never
//! needs a lock around its world state. `StResource` is the handle that lets
//! the few components which need the same structure (the chunk manager, the
//! chunks it builds, the collision and ray queries) refer to one owned value
//! without it becoming ambient global state.

pub mod st_resource;

pub use st_resource::StResource;
