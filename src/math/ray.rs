use glam::{Affine3A, Mat3A, Quat, Vec3};

/// Rays parallel to a plane (|cos| below this) never intersect it.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A ray in world space. `direction` is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// A zero direction yields a degenerate ray that intersects nothing.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Camera-forward ray for a viewer pose (forward is `-Z` in view space).
    #[must_use]
    pub fn from_pose(position: Vec3, rotation: Quat) -> Self {
        Self::new(position, rotation * Vec3::NEG_Z)
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }
}

/// An infinite plane `{ p | normal · (p - point) = 0 }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    #[must_use]
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Horizontal plane facing up at the given height.
    #[must_use]
    pub fn horizontal(height: f32) -> Self {
        Self {
            point: Vec3::new(0.0, height, 0.0),
            normal: Vec3::Y,
        }
    }

    /// Signed distance from `p` to the plane.
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        self.normal.dot(p - self.point)
    }
}

/// A resolved intersection along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// Unit surface normal, oriented towards the ray origin.
    pub normal: Vec3,
}

/// Ray/plane intersection. Returns the ray parameter `t >= 0`, or `None` if
/// the ray is parallel to the plane or the plane lies behind the origin.
#[must_use]
pub fn ray_plane_intersection(ray: &Ray, plane: &Plane) -> Option<f32> {
    let denom = plane.normal.dot(ray.direction);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = plane.normal.dot(plane.point - ray.origin) / denom;
    (t >= 0.0).then_some(t)
}

/// Double-sided Möller–Trumbore ray/triangle intersection.
///
/// Returns the ray parameter of the hit, if any.
#[must_use]
pub fn ray_triangle_intersection(ray: &Ray, triangle: [Vec3; 3]) -> Option<f32> {
    let [a, b, c] = triangle;
    let edge1 = b - a;
    let edge2 = c - a;

    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Transforms a surface normal by the inverse-transpose of `matrix`'s linear
/// part, so that non-uniform scale keeps it perpendicular to the surface.
#[must_use]
pub fn transform_normal(matrix: &Affine3A, normal: Vec3) -> Vec3 {
    let linear: Mat3A = matrix.matrix3;
    if linear.determinant().abs() < f32::EPSILON {
        return Vec3::ZERO;
    }
    let normal_matrix = linear.inverse().transpose();
    Vec3::from(normal_matrix * glam::Vec3A::from(normal)).normalize_or_zero()
}

/// Orientation of an object resting on a surface with the given normal.
///
/// Horizontal surfaces align the object's up axis (`+Y`) with the normal.
/// Vertical surfaces keep the object upright and turn its front (`+Z`) to face
/// out of the surface.
#[must_use]
pub fn orientation_from_normal(normal: Vec3, vertical_surface: bool) -> Quat {
    let n = normal.normalize_or_zero();
    if n == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    if vertical_surface {
        let horizontal = Vec3::new(n.x, 0.0, n.z).normalize_or_zero();
        if horizontal != Vec3::ZERO {
            return Quat::from_rotation_arc(Vec3::Z, horizontal);
        }
    }

    Quat::from_rotation_arc(Vec3::Y, n)
}
