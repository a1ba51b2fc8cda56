use crate::config::LoaderConfig;
use crate::scene::ModelGraph;

/// Relative tolerance under which a graph counts as already normalized.
const NORMALIZE_EPSILON: f32 = 1e-4;

/// Post-load pass applied to every model, fallbacks included.
///
/// Enables shadows on all meshes, sets texture anisotropy, then centers and
/// rescales the model (see [`normalize`]).
pub fn post_process(graph: &mut ModelGraph, config: &LoaderConfig) {
    for mesh in graph.meshes_mut() {
        mesh.cast_shadows = true;
        mesh.receive_shadows = true;
        for slot in &mut mesh.material.textures {
            slot.sampler.anisotropy_clamp = config.anisotropy;
        }
    }

    normalize(graph, config.target_size);
}

/// Moves the bounding-box center to the origin and scales uniformly so the
/// largest dimension equals `target_size`.
///
/// Returns `false` when nothing changed: empty graphs, degenerate (flat in
/// every axis) bounds, and graphs that are already normalized.
pub fn normalize(graph: &mut ModelGraph, target_size: f32) -> bool {
    let bounds = graph.bounding_box();
    if bounds.is_empty() {
        return false;
    }

    let center = bounds.center();
    let max_dim = bounds.max_dimension();
    let tolerance = NORMALIZE_EPSILON * target_size.max(1.0);

    let factor = if max_dim > f32::EPSILON { target_size / max_dim } else { 1.0 };
    let centered = center.length() <= tolerance;
    let sized = (factor - 1.0).abs() <= NORMALIZE_EPSILON;
    if centered && sized {
        return false;
    }

    let roots = graph.root_indices.clone();
    for root in roots {
        if let Some(node) = graph.nodes.get_mut(root) {
            node.transform.prepend_offset_and_scale(-center, factor);
        }
    }
    true
}
