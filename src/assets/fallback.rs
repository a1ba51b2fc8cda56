use std::sync::Arc;

use crate::scene::{Geometry, Material, Mesh, ModelGraph};

/// Placeholder model: a unit box with a grey, translucent material.
#[must_use]
pub fn fallback_graph() -> ModelGraph {
    let mut mesh = Mesh::new(Arc::new(Geometry::new_box(1.0, 1.0, 1.0)), Material::placeholder());
    mesh.name = "Fallback".to_string();

    let mut graph = ModelGraph::from_mesh(mesh);
    graph.nodes[0].name = Some("Fallback".to_string());
    graph
}
