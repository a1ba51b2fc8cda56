use serde::Serialize;

use crate::assets::resource::AnimationClip;
use crate::scene::ModelGraph;

/// Size statistics of a model, computed once at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelMetrics {
    pub vertex_count: usize,
    /// Sum of `index_count / 3`. Non-indexed meshes add no faces.
    pub face_count: usize,
    /// One material per mesh.
    pub material_count: usize,
    pub animation_count: usize,
}

impl ModelMetrics {
    /// Walks the graph once. Read-only.
    #[must_use]
    pub fn collect(graph: &ModelGraph, animations: &[AnimationClip]) -> Self {
        graph.meshes().fold(
            Self {
                animation_count: animations.len(),
                ..Self::default()
            },
            |mut acc, mesh| {
                acc.vertex_count += mesh.geometry.vertex_count();
                acc.face_count += mesh.geometry.indexed_face_count();
                acc.material_count += 1;
                acc
            },
        )
    }
}
