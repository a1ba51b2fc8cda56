use glam::{Quat, Vec3};

use crate::errors::{PlacementError, Result};
use crate::math::Ray;

/// Platform reference frame. Not `Clone`: it is released by value, once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ReferenceFrameHandle(u64);

impl ReferenceFrameHandle {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Platform hit-test source bound to a reference frame. Not `Clone`.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HitTestSourceHandle(u64);

impl HitTestSourceHandle {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// One hit-test result, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPose {
    pub position: Vec3,
    /// Pose orientation. The surface normal is the pose's local `+Y`.
    pub orientation: Quat,
}

impl HitPose {
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }
}

/// Result of the capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSupport {
    Supported,
    Unsupported,
    PermissionDenied,
    InsecureContext,
}

impl SessionSupport {
    #[must_use]
    pub fn is_supported(self) -> bool {
        self == Self::Supported
    }

    /// Status line for the UI.
    #[must_use]
    pub fn status_message(self) -> &'static str {
        match self {
            Self::Supported => "AR is supported. Tap to start placing furniture.",
            Self::Unsupported => "AR is not supported on this device. Using the 3D preview instead.",
            Self::PermissionDenied => "Camera permission was denied. Allow camera access to use AR.",
            Self::InsecureContext => "AR requires a secure (HTTPS) connection.",
        }
    }

    /// The error a session request fails with, if any.
    #[must_use]
    pub fn to_error(self) -> Option<PlacementError> {
        match self {
            Self::Supported => None,
            Self::Unsupported => Some(PlacementError::TrackingUnsupported),
            Self::PermissionDenied => Some(PlacementError::PermissionDenied),
            Self::InsecureContext => Some(PlacementError::InsecureContext),
        }
    }
}

/// Platform spatial-tracking API
///
/// The only point of contact with device capabilities. Implementations wrap
/// e.g. a WebXR or ARCore session. All calls happen on the frame loop.
pub trait SpatialPlatform {
    /// Checks whether tracking sessions can be started.
    fn probe_support(&mut self) -> SessionSupport;

    /// Starts the platform session.
    fn request_session(&mut self) -> Result<()>;

    fn acquire_reference_frame(&mut self) -> Result<ReferenceFrameHandle>;

    fn acquire_hit_test_source(&mut self, frame: &ReferenceFrameHandle) -> Result<HitTestSourceHandle>;

    /// Hit-tests `ray` for the current frame. Results may be in any order.
    fn hit_test(&mut self, source: &HitTestSourceHandle, frame: &ReferenceFrameHandle, ray: &Ray) -> Vec<HitPose>;

    fn release_hit_test_source(&mut self, source: HitTestSourceHandle);

    fn release_reference_frame(&mut self, frame: ReferenceFrameHandle);

    /// Ends the platform session. Not called when the platform itself
    /// reported the end.
    fn end_session(&mut self);
}

/// Platform without tracking support (desktop preview, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlatform;

impl SpatialPlatform for NullPlatform {
    fn probe_support(&mut self) -> SessionSupport {
        SessionSupport::Unsupported
    }

    fn request_session(&mut self) -> Result<()> {
        Err(PlacementError::TrackingUnsupported)
    }

    fn acquire_reference_frame(&mut self) -> Result<ReferenceFrameHandle> {
        Err(PlacementError::TrackingUnsupported)
    }

    fn acquire_hit_test_source(&mut self, _frame: &ReferenceFrameHandle) -> Result<HitTestSourceHandle> {
        Err(PlacementError::TrackingUnsupported)
    }

    fn hit_test(&mut self, _source: &HitTestSourceHandle, _frame: &ReferenceFrameHandle, _ray: &Ray) -> Vec<HitPose> {
        Vec::new()
    }

    fn release_hit_test_source(&mut self, _source: HitTestSourceHandle) {}

    fn release_reference_frame(&mut self, _frame: ReferenceFrameHandle) {}

    fn end_session(&mut self) {}
}
