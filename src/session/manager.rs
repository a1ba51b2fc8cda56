use crate::errors::Result;
use crate::math::Ray;
use crate::session::platform::{HitPose, HitTestSourceHandle, ReferenceFrameHandle, SessionSupport, SpatialPlatform};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The user exited AR.
    User,
    /// The platform ended the session on its own.
    Platform,
    /// An error on the frame loop.
    Error,
    /// The owner is being dropped.
    Teardown,
}

/// Backend resources of a running session.
///
/// The hit-test source is bound to the reference frame; both live exactly as
/// long as the session.
#[derive(Debug)]
pub struct TrackingSession {
    reference_frame: ReferenceFrameHandle,
    hit_test_source: HitTestSourceHandle,
}

impl TrackingSession {
    #[must_use]
    pub fn reference_frame(&self) -> &ReferenceFrameHandle {
        &self.reference_frame
    }

    #[must_use]
    pub fn hit_test_source(&self) -> &HitTestSourceHandle {
        &self.hit_test_source
    }
}

/// Session lifecycle manager
///
/// Sole owner of the platform and of the [`TrackingSession`]. Acquisition is
/// all-or-nothing, release happens exactly once (hit-test source first), and
/// dropping the manager ends any running session.
pub struct SessionManager<P: SpatialPlatform> {
    platform: P,
    support: Option<SessionSupport>,
    session: Option<TrackingSession>,
}

impl<P: SpatialPlatform> SessionManager<P> {
    #[must_use]
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            support: None,
            session: None,
        }
    }

    /// Runs the capability probe once and caches the answer.
    pub fn probe(&mut self) -> SessionSupport {
        if let Some(support) = self.support {
            return support;
        }
        let support = self.platform.probe_support();
        log::info!("Spatial tracking support: {support:?}");
        self.support = Some(support);
        support
    }

    #[must_use]
    pub fn support(&self) -> Option<SessionSupport> {
        self.support
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<&TrackingSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Starts a session. Returns the running one if already started.
    ///
    /// On failure every partially acquired resource is released before the
    /// error is returned.
    pub fn start(&mut self) -> Result<&TrackingSession> {
        let session = match self.session.take() {
            Some(running) => running,
            None => {
                let session = self.acquire()?;
                log::info!(
                    "Tracking session started (frame {}, hit-test source {})",
                    session.reference_frame.id(),
                    session.hit_test_source.id()
                );
                session
            }
        };
        Ok(self.session.insert(session))
    }

    fn acquire(&mut self) -> Result<TrackingSession> {
        if let Some(err) = self.probe().to_error() {
            return Err(err);
        }

        self.platform.request_session()?;

        let reference_frame = match self.platform.acquire_reference_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Reference frame unavailable: {e}");
                self.platform.end_session();
                return Err(e);
            }
        };

        let hit_test_source = match self.platform.acquire_hit_test_source(&reference_frame) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Hit-test source unavailable: {e}");
                self.platform.release_reference_frame(reference_frame);
                self.platform.end_session();
                return Err(e);
            }
        };

        Ok(TrackingSession {
            reference_frame,
            hit_test_source,
        })
    }

    /// Ends the session. Returns `false` if there was none.
    pub fn end(&mut self, reason: EndReason) -> bool {
        let Some(TrackingSession {
            reference_frame,
            hit_test_source,
        }) = self.session.take()
        else {
            return false;
        };

        self.platform.release_hit_test_source(hit_test_source);
        self.platform.release_reference_frame(reference_frame);
        if reason != EndReason::Platform {
            self.platform.end_session();
        }

        log::info!("Tracking session ended ({reason:?})");
        true
    }

    /// Hit-tests against the running session. Empty without a session.
    pub fn hit_test(&mut self, ray: &Ray) -> Vec<HitPose> {
        match &self.session {
            Some(session) => self
                .platform
                .hit_test(&session.hit_test_source, &session.reference_frame, ray),
            None => Vec::new(),
        }
    }
}

impl<P: SpatialPlatform> Drop for SessionManager<P> {
    fn drop(&mut self) {
        self.end(EndReason::Teardown);
    }
}
