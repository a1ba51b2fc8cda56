#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Model loading, surface detection and placement core for AR furniture
//! previews.
//!
//! - [`assets`]: deduplicated async model cache with placeholder fallback
//! - [`detection`]: floor/wall classification with native and heuristic backends
//! - [`placement`]: `Searching -> Valid -> Placed` state machine
//! - [`session`]: tracking session lifecycle over a [`SpatialPlatform`]
//! - [`engine`]: frame-loop façade tying it all together

pub mod assets;
pub mod config;
pub mod detection;
pub mod engine;
pub mod errors;
pub mod math;
pub mod placement;
pub mod scene;
pub mod session;

pub use assets::{Diagnostic, FallbackKind, ModelFormat, ModelMetrics, ModelResource, ResourceCache, validate_model_file};
pub use config::{DetectorConfig, EngineConfig, LoaderConfig};
pub use detection::{HitCandidate, PlacementMode, SurfaceDetector, SurfaceType};
pub use engine::{FrameOutput, PlacementEngine};
pub use errors::{PlacementError, Result};
pub use math::{BoundingBox, Plane, Ray};
pub use placement::{PlacementEvent, PlacementMachine, PlacementPhase, PlacementResult, PlacementState};
pub use scene::{ModelGraph, Scene, SceneObject, Transform};
pub use session::{NullPlatform, SessionManager, SessionSupport, SpatialPlatform, TrackingSession};
