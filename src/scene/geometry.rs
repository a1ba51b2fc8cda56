use glam::Vec3;

use crate::math::BoundingBox;

/// CPU-side triangle geometry.
///
/// Only the data the placement core reads is kept: positions for bounds and
/// ray casting, normals when the source provides them, and optional indices.
/// Geometry is shared between a cached model and its placed clones through
/// `Arc`, so it is never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    indices: Option<Vec<u32>>,
    bounding_box: BoundingBox,
}

impl Geometry {
    #[must_use]
    pub fn new(positions: Vec<Vec3>) -> Self {
        let bounding_box = BoundingBox::from_points(positions.iter().copied());
        Self {
            positions,
            normals: None,
            indices: None,
            bounding_box,
        }
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    #[must_use]
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    #[must_use]
    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// Number of triangles: `index_count / 3` for indexed geometry,
    /// `vertex_count / 3` for triangle soup.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Faces described by the index buffer, `index_count / 3`. Zero for
    /// triangle soup.
    #[inline]
    #[must_use]
    pub fn indexed_face_count(&self) -> usize {
        self.index_count() / 3
    }

    /// Local-space bounds, computed once at construction.
    #[inline]
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Iterates triangles in local space. Triangles referencing out-of-range
    /// vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let count = self.face_count();
        (0..count).filter_map(move |face| {
            let base = face * 3;
            let [a, b, c] = match &self.indices {
                Some(indices) => [
                    indices[base] as usize,
                    indices[base + 1] as usize,
                    indices[base + 2] as usize,
                ],
                None => [base, base + 1, base + 2],
            };
            Some([
                *self.positions.get(a)?,
                *self.positions.get(b)?,
                *self.positions.get(c)?,
            ])
        })
    }

    /// Axis-aligned box centered at the origin.
    #[must_use]
    pub fn new_box(width: f32, height: f32, depth: f32) -> Self {
        let w = width / 2.0;
        let h = height / 2.0;
        let d = depth / 2.0;

        // 24 vertices (4 per face)
        let positions = [
            // Front face (+Z)
            [-w, -h, d],
            [w, -h, d],
            [w, h, d],
            [-w, h, d],
            // Back face (-Z)
            [-w, -h, -d],
            [-w, h, -d],
            [w, h, -d],
            [w, -h, -d],
            // Top face (+Y)
            [-w, h, -d],
            [-w, h, d],
            [w, h, d],
            [w, h, -d],
            // Bottom face (-Y)
            [-w, -h, -d],
            [w, -h, -d],
            [w, -h, d],
            [-w, -h, d],
            // Right face (+X)
            [w, -h, -d],
            [w, h, -d],
            [w, h, d],
            [w, -h, d],
            // Left face (-X)
            [-w, -h, -d],
            [-w, -h, d],
            [-w, h, d],
            [-w, h, -d],
        ];

        let face_normals = [Vec3::Z, Vec3::NEG_Z, Vec3::Y, Vec3::NEG_Y, Vec3::X, Vec3::NEG_X];
        let normals = face_normals
            .iter()
            .flat_map(|n| std::iter::repeat_n(*n, 4))
            .collect();

        // 2 triangles per face, CCW
        let indices = (0..6u32)
            .flat_map(|face| {
                let base = face * 4;
                [base, base + 1, base + 2, base, base + 2, base + 3]
            })
            .collect();

        Self::new(positions.iter().map(|p| Vec3::from_array(*p)).collect())
            .with_normals(normals)
            .with_indices(indices)
    }

    /// Single-quad plane in the XY plane, facing `+Z`.
    #[must_use]
    pub fn new_plane(width: f32, height: f32) -> Self {
        let w = width / 2.0;
        let h = height / 2.0;

        let positions = vec![
            Vec3::new(-w, h, 0.0),
            Vec3::new(w, h, 0.0),
            Vec3::new(-w, -h, 0.0),
            Vec3::new(w, -h, 0.0),
        ];

        Self::new(positions)
            .with_normals(vec![Vec3::Z; 4])
            .with_indices(vec![0, 2, 1, 2, 3, 1])
    }
}
