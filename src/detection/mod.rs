//! Surface detection
//!
//! Classifies targeted surfaces as floor or wall and picks one
//! [`HitCandidate`] per frame for the active [`PlacementMode`].

pub mod candidate;
pub mod detector;
pub mod surface;

pub use candidate::{HitCandidate, RawHit, select_candidate};
pub use detector::{DetectionContext, DetectorBackend, HeuristicDetector, NativeDetector, SurfaceDetector};
pub use surface::{FLOOR_NORMAL_THRESHOLD, PlacementMode, SurfaceType};
