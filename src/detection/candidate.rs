use glam::{Quat, Vec3};

use crate::detection::surface::{PlacementMode, SurfaceType};
use crate::math::orientation_from_normal;

/// Unclassified intersection reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHit {
    pub point: Vec3,
    /// World-space normal, any length.
    pub normal: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Pose orientation when the backend reports one.
    pub orientation: Option<Quat>,
}

/// One frame's classified surface hit.
///
/// The surface type is computed from the normal on construction and cannot be
/// set independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCandidate {
    point: Vec3,
    normal: Vec3,
    surface_type: SurfaceType,
    source_distance: f32,
    orientation: Quat,
}

impl HitCandidate {
    /// Classifies a raw hit. Returns `None` for non-finite data, zero normals
    /// and negative distances.
    #[must_use]
    pub fn from_raw(raw: RawHit) -> Option<Self> {
        if !raw.point.is_finite() || !raw.normal.is_finite() || raw.distance.is_nan() || raw.distance < 0.0 {
            return None;
        }

        let normal = raw.normal.try_normalize()?;
        let surface_type = SurfaceType::classify(raw.normal);
        let orientation = raw
            .orientation
            .filter(|q| q.is_finite())
            .map_or_else(|| orientation_from_normal(normal, surface_type.is_vertical()), Quat::normalize);

        Some(Self {
            point: raw.point,
            normal,
            surface_type,
            source_distance: raw.distance,
            orientation,
        })
    }

    #[inline]
    #[must_use]
    pub fn point(&self) -> Vec3 {
        self.point
    }

    /// Unit normal.
    #[inline]
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    #[inline]
    #[must_use]
    pub fn surface_type(&self) -> SurfaceType {
        self.surface_type
    }

    #[inline]
    #[must_use]
    pub fn source_distance(&self) -> f32 {
        self.source_distance
    }

    #[inline]
    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }
}

/// Nearest hit whose surface type matches `mode`.
pub fn select_candidate(hits: impl IntoIterator<Item = RawHit>, mode: PlacementMode) -> Option<HitCandidate> {
    hits.into_iter()
        .filter_map(HitCandidate::from_raw)
        .filter(|c| mode.accepts(c.surface_type))
        .min_by(|a, b| a.source_distance.total_cmp(&b.source_distance))
}
