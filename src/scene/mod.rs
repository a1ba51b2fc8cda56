//! Scene-graph collaborator
//!
//! Minimal CPU-side scene representation shared by the resource pipeline and
//! the heuristic surface detector:
//!
//! - [`ModelGraph`]: decoded model hierarchy, flat node list with child indices
//! - [`Geometry`] / [`Material`]: mesh data and surface description
//! - [`Scene`]: placed model instances with ray casting

pub mod geometry;
pub mod graph;
pub mod material;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod transform;

pub use geometry::Geometry;
pub use graph::{GraphNode, Mesh, ModelGraph};
pub use material::{Material, TextureKind, TextureSampler, TextureSlot};
pub use scene::{ObjectKey, Scene, SceneObject};
pub use transform::Transform;
