//! Session lifecycle
//!
//! [`SpatialPlatform`] abstracts the device tracking API; [`SessionManager`]
//! owns the resulting [`TrackingSession`] and guarantees its release.

pub mod manager;
pub mod platform;

pub use manager::{EndReason, SessionManager, TrackingSession};
pub use platform::{
    HitPose, HitTestSourceHandle, NullPlatform, ReferenceFrameHandle, SessionSupport, SpatialPlatform,
};
