use crate::config::DetectorConfig;
use crate::detection::candidate::{HitCandidate, RawHit, select_candidate};
use crate::detection::surface::PlacementMode;
use crate::math::{Plane, Ray, ray_plane_intersection};
use crate::scene::Scene;
use crate::session::{SessionManager, SpatialPlatform};

/// Which backend a [`SurfaceDetector`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorBackend {
    Native,
    Heuristic,
}

/// Per-frame inputs borrowed from the engine.
pub struct DetectionContext<'a, P: SpatialPlatform> {
    pub sessions: &'a mut SessionManager<P>,
    pub scene: &'a Scene,
}

/// Hit-tests through the platform's tracking session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NativeDetector;

impl NativeDetector {
    pub fn detect<P: SpatialPlatform>(
        &self,
        ray: &Ray,
        mode: PlacementMode,
        sessions: &mut SessionManager<P>,
    ) -> Option<HitCandidate> {
        let hits = sessions.hit_test(ray).into_iter().map(|pose| RawHit {
            point: pose.position,
            normal: pose.normal(),
            distance: pose.position.distance(ray.origin),
            orientation: Some(pose.orientation),
        });
        select_candidate(hits, mode)
    }
}

/// Ray casts against a virtual floor plane or scene geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicDetector {
    floor: Plane,
    max_distance: f32,
}

impl HeuristicDetector {
    #[must_use]
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            floor: Plane::horizontal(config.floor_height),
            max_distance: config.max_distance,
        }
    }

    #[must_use]
    pub fn floor(&self) -> &Plane {
        &self.floor
    }

    /// Floor mode hits the virtual floor only. Wall mode hits scene geometry
    /// and keeps the nearest wall-like surface.
    #[must_use]
    pub fn detect(&self, ray: &Ray, mode: PlacementMode, scene: &Scene) -> Option<HitCandidate> {
        match mode {
            PlacementMode::Floor => {
                let t = ray_plane_intersection(ray, &self.floor).filter(|&t| t <= self.max_distance)?;
                let hit = RawHit {
                    point: ray.at(t),
                    normal: self.floor.normal,
                    distance: t,
                    orientation: None,
                };
                select_candidate([hit], mode)
            }
            PlacementMode::Wall => {
                let hits = scene.raycast(ray, self.max_distance).into_iter().map(|hit| RawHit {
                    point: hit.point,
                    normal: hit.normal,
                    distance: hit.distance,
                    orientation: None,
                });
                select_candidate(hits, mode)
            }
        }
    }
}

/// Surface detector
///
/// The backend is chosen when a session starts or ends, never per frame.
/// Both backends produce the same [`HitCandidate`] contract and never block.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceDetector {
    Native(NativeDetector),
    Heuristic(HeuristicDetector),
}

impl SurfaceDetector {
    #[must_use]
    pub fn heuristic(config: &DetectorConfig) -> Self {
        Self::Heuristic(HeuristicDetector::new(config))
    }

    #[must_use]
    pub fn native() -> Self {
        Self::Native(NativeDetector)
    }

    #[must_use]
    pub fn backend(&self) -> DetectorBackend {
        match self {
            Self::Native(_) => DetectorBackend::Native,
            Self::Heuristic(_) => DetectorBackend::Heuristic,
        }
    }

    /// Best candidate for this frame, if any. A missing session or hit-test
    /// source simply yields `None`.
    pub fn detect<P: SpatialPlatform>(
        &self,
        ray: &Ray,
        mode: PlacementMode,
        ctx: DetectionContext<'_, P>,
    ) -> Option<HitCandidate> {
        if ray.is_degenerate() {
            return None;
        }

        let candidate = match self {
            Self::Native(native) => native.detect(ray, mode, ctx.sessions),
            Self::Heuristic(heuristic) => heuristic.detect(ray, mode, ctx.scene),
        };
        log::trace!("{:?} detector ({mode:?}): {candidate:?}", self.backend());
        candidate
    }
}
