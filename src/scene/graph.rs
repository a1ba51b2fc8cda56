use std::sync::Arc;

use glam::Affine3A;

use crate::math::BoundingBox;
use crate::scene::geometry::Geometry;
use crate::scene::material::Material;
use crate::scene::transform::Transform;

/// Renderable component of a graph node.
///
/// Geometry is shared; material and shadow flags are per instance.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub visible: bool,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            name: "Mesh".to_string(),
            geometry,
            material,
            visible: true,
            cast_shadows: false,
            receive_shadows: false,
        }
    }
}

/// A node of a [`ModelGraph`].
#[derive(Debug, Clone, Default)]
pub struct GraphNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// Indices of the children in [`ModelGraph::nodes`]
    pub children: Vec<usize>,
    pub mesh: Option<Mesh>,
}

impl GraphNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mesh(mesh: Mesh) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::default()
        }
    }
}

/// Flat, thread-safe node hierarchy produced by a decoder.
///
/// Holds no scene handles, so it can be built on a worker thread, cached, and
/// cloned into any number of scene objects.
#[derive(Debug, Clone, Default)]
pub struct ModelGraph {
    pub nodes: Vec<GraphNode>,
    /// Indices of the top-level nodes in `nodes`
    pub root_indices: Vec<usize>,
}

impl ModelGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph with a single root node carrying `mesh`.
    #[must_use]
    pub fn from_mesh(mesh: Mesh) -> Self {
        Self {
            nodes: vec![GraphNode::with_mesh(mesh)],
            root_indices: vec![0],
        }
    }

    /// Appends a node and returns its index.
    pub fn push_node(&mut self, node: GraphNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.nodes.iter().filter_map(|n| n.mesh.as_ref())
    }

    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut Mesh> {
        self.nodes.iter_mut().filter_map(|n| n.mesh.as_mut())
    }

    #[must_use]
    pub fn has_geometry(&self) -> bool {
        self.meshes().any(|m| m.geometry.vertex_count() > 0)
    }

    /// Model-space matrix of every node, indexed like `nodes`.
    ///
    /// Nodes not reachable from a root keep the identity matrix. Cycles in
    /// malformed input are cut by visiting each node at most once.
    #[must_use]
    pub fn world_matrices(&self) -> Vec<Affine3A> {
        let mut matrices = vec![Affine3A::IDENTITY; self.nodes.len()];
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, Affine3A)> = self
            .root_indices
            .iter()
            .rev()
            .map(|&idx| (idx, Affine3A::IDENTITY))
            .collect();

        while let Some((idx, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(idx) else {
                continue;
            };
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            let world = parent * node.transform.local_matrix();
            matrices[idx] = world;
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }

        matrices
    }

    /// Model-space bounds of all mesh geometry.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let matrices = self.world_matrices();
        self.nodes
            .iter()
            .zip(&matrices)
            .filter_map(|(node, world)| {
                let mesh = node.mesh.as_ref()?;
                let local = mesh.geometry.bounding_box();
                (!local.is_empty()).then(|| local.transform(world))
            })
            .fold(BoundingBox::empty(), |acc, b| acc.union(&b))
    }
}
