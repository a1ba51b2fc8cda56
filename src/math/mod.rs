//! Geometry math utilities
//!
//! Small, allocation-free helpers shared by the resource pipeline and the
//! surface detector:
//!
//! - [`BoundingBox`]: axis-aligned bounds with transform/union support
//! - [`Ray`] and [`Plane`]: targeting rays and infinite planes
//! - [`ray_plane_intersection`] / [`ray_triangle_intersection`]
//! - [`transform_normal`] / [`orientation_from_normal`]

pub mod bounds;
pub mod ray;

pub use bounds::BoundingBox;
pub use ray::{
    Plane, Ray, RayHit, orientation_from_normal, ray_plane_intersection,
    ray_triangle_intersection, transform_normal,
};
