use glam::Affine3A;
use slotmap::{SlotMap, new_key_type};

use crate::math::{BoundingBox, Ray, RayHit, ray_triangle_intersection};
use crate::scene::geometry::Geometry;
use crate::scene::graph::ModelGraph;
use crate::scene::transform::Transform;

new_key_type! {
    /// Handle to an object stored in a [`Scene`].
    pub struct ObjectKey;
}

/// A model instance placed in the scene.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    /// Exclusively owned clone of a model graph
    pub graph: ModelGraph,
    pub transform: Transform,
    pub visible: bool,
    /// Whether ray casts may hit this object.
    pub pickable: bool,
}

impl SceneObject {
    #[must_use]
    pub fn new(name: impl Into<String>, graph: ModelGraph) -> Self {
        Self {
            name: name.into(),
            graph,
            transform: Transform::new(),
            visible: true,
            pickable: true,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn world_bounding_box(&self) -> BoundingBox {
        let local = self.graph.bounding_box();
        if local.is_empty() {
            return local;
        }
        local.transform(&self.transform.local_matrix())
    }
}

/// Renderable objects the heuristic detector can ray cast against.
///
/// Pure data: no GPU state lives here. A renderer reads objects and their
/// transforms each frame.
#[derive(Debug, Default)]
pub struct Scene {
    objects: SlotMap<ObjectKey, SceneObject>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectKey {
        self.objects.insert(object)
    }

    pub fn remove(&mut self, key: ObjectKey) -> Option<SceneObject> {
        self.objects.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        self.objects.get_mut(key)
    }

    #[must_use]
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &SceneObject)> {
        self.objects.iter()
    }

    /// Intersects `ray` with every triangle of every visible, pickable object.
    ///
    /// Returns all hits within `max_distance`, nearest first. Normals are
    /// world-space face normals flipped to face the ray origin.
    #[must_use]
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Vec<RayHit> {
        let mut hits = Vec::new();

        for (_, object) in self.objects.iter().filter(|(_, o)| o.visible && o.pickable) {
            if !ray_hits_box(ray, &object.world_bounding_box(), max_distance) {
                continue;
            }

            let object_matrix = object.transform.local_matrix();
            let node_matrices = object.graph.world_matrices();

            for (node, node_matrix) in object.graph.nodes.iter().zip(&node_matrices) {
                let Some(mesh) = node.mesh.as_ref().filter(|m| m.visible) else {
                    continue;
                };
                let world = object_matrix * *node_matrix;
                collect_mesh_hits(ray, &world, &mesh.geometry, max_distance, &mut hits);
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn collect_mesh_hits(
    ray: &Ray,
    world: &Affine3A,
    geometry: &Geometry,
    max_distance: f32,
    hits: &mut Vec<RayHit>,
) {
    for triangle in geometry.triangles() {
        let [a, b, c] = triangle.map(|p| world.transform_point3(p));
        let Some(t) = ray_triangle_intersection(ray, [a, b, c]) else {
            continue;
        };
        if t > max_distance {
            continue;
        }

        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        if normal.dot(ray.direction) > 0.0 {
            normal = -normal;
        }
        hits.push(RayHit {
            distance: t,
            point: ray.at(t),
            normal,
        });
    }
}

/// Slab test against an axis-aligned box. Boundaries are inclusive, so a ray
/// running along a face still reaches the triangle test.
fn ray_hits_box(ray: &Ray, bounds: &BoundingBox, max_distance: f32) -> bool {
    if bounds.is_empty() {
        return false;
    }

    let mut t_near = 0.0_f32;
    let mut t_far = max_distance;
    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        let (min, max) = (bounds.min[axis], bounds.max[axis]);

        if direction == 0.0 {
            // Parallel to this slab: inside it or never.
            if origin < min || origin > max {
                return false;
            }
            continue;
        }

        let inv = direction.recip();
        let (t0, t1) = ((min - origin) * inv, (max - origin) * inv);
        t_near = t_near.max(t0.min(t1));
        t_far = t_far.min(t0.max(t1));
        if t_near > t_far {
            return false;
        }
    }
    true
}
