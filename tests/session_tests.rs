//! Session Lifecycle Tests
//!
//! Tests for:
//! - Acquisition order (reference frame, then hit-test source)
//! - Release order and exactly-once release on every end path
//! - Cleanup of partial acquisitions on failure
//! - Capability probe and status messages
//! - Teardown on drop

mod common;

use common::{Call, MockPlatform};
use glam::{Quat, Vec3};
use myth_placement::errors::PlacementError;
use myth_placement::math::Ray;
use myth_placement::session::{EndReason, HitPose, NullPlatform, SessionManager, SessionSupport};

// ============================================================================
// Normal lifecycle
// ============================================================================

#[test]
fn start_then_end_releases_source_before_frame() {
    let (platform, log) = MockPlatform::supported();
    let mut sessions = SessionManager::new(platform);

    let session = sessions.start().unwrap();
    assert_eq!(session.reference_frame().id(), 1);
    assert_eq!(session.hit_test_source().id(), 2);
    assert!(sessions.is_active());

    assert!(sessions.end(EndReason::User));
    assert!(!sessions.is_active());

    assert_eq!(
        log.borrow().calls,
        vec![
            Call::Probe,
            Call::RequestSession,
            Call::AcquireFrame(1),
            Call::AcquireSource(2),
            Call::ReleaseSource(2),
            Call::ReleaseFrame(1),
            Call::EndSession,
        ]
    );
}

#[test]
fn start_is_idempotent() {
    let (platform, log) = MockPlatform::supported();
    let mut sessions = SessionManager::new(platform);

    let first = sessions.start().unwrap().hit_test_source().id();
    let second = sessions.start().unwrap().hit_test_source().id();

    assert_eq!(first, second);
    assert_eq!(log.borrow().count(&Call::RequestSession), 1);
    assert_eq!(log.borrow().count(&Call::Probe), 1);
}

#[test]
fn end_is_idempotent() {
    let (platform, log) = MockPlatform::supported();
    let mut sessions = SessionManager::new(platform);
    sessions.start().unwrap();

    assert!(sessions.end(EndReason::User));
    assert!(!sessions.end(EndReason::User));
    assert!(!sessions.end(EndReason::Error));

    assert_eq!(log.borrow().releases(), vec![Call::ReleaseSource(2), Call::ReleaseFrame(1)]);
    assert_eq!(log.borrow().count(&Call::EndSession), 1);
}

#[test]
fn end_without_session_is_a_no_op() {
    let (platform, log) = MockPlatform::supported();
    let mut sessions = SessionManager::new(platform);

    assert!(!sessions.end(EndReason::User));
    assert!(log.borrow().calls.is_empty());
}

#[test]
fn platform_end_releases_without_ending_again() {
    let (platform, log) = MockPlatform::supported();
    let mut sessions = SessionManager::new(platform);
    sessions.start().unwrap();

    assert!(sessions.end(EndReason::Platform));

    assert_eq!(log.borrow().releases().len(), 2);
    assert_eq!(log.borrow().count(&Call::EndSession), 0);
}

#[test]
fn session_can_restart_after_end() {
    let (platform, log) = MockPlatform::supported();
    let mut sessions = SessionManager::new(platform);

    sessions.start().unwrap();
    sessions.end(EndReason::User);
    let session = sessions.start().unwrap();

    assert_eq!(session.reference_frame().id(), 3);
    assert_eq!(log.borrow().count(&Call::RequestSession), 2);
}

// ============================================================================
// Failure paths
// ============================================================================

#[test]
fn failed_source_releases_frame() {
    let (mut platform, log) = MockPlatform::supported();
    platform.fail_source = true;
    let mut sessions = SessionManager::new(platform);

    let err = sessions.start().unwrap_err();
    assert!(matches!(err, PlacementError::HitTestSourceUnavailable(_)));
    assert!(!sessions.is_active());

    assert_eq!(log.borrow().releases(), vec![Call::ReleaseFrame(1)]);
    assert_eq!(log.borrow().count(&Call::EndSession), 1);

    // Nothing left to release.
    drop(sessions);
    assert_eq!(log.borrow().releases().len(), 1);
    assert_eq!(log.borrow().count(&Call::EndSession), 1);
}

#[test]
fn failed_frame_ends_platform_session() {
    let (mut platform, log) = MockPlatform::supported();
    platform.fail_frame = true;
    let mut sessions = SessionManager::new(platform);

    let err = sessions.start().unwrap_err();
    assert!(matches!(err, PlacementError::ReferenceFrameUnavailable(_)));
    assert!(log.borrow().releases().is_empty());
    assert_eq!(log.borrow().count(&Call::EndSession), 1);
}

#[test]
fn failed_request_acquires_nothing() {
    let (mut platform, log) = MockPlatform::supported();
    platform.fail_session = true;
    let mut sessions = SessionManager::new(platform);

    assert!(matches!(sessions.start(), Err(PlacementError::SessionStartFailed(_))));
    assert_eq!(log.borrow().calls, vec![Call::Probe, Call::RequestSession]);
}

#[test]
fn capability_failures_never_touch_the_platform_session() {
    for (support, expected) in [
        (SessionSupport::Unsupported, "TrackingUnsupported"),
        (SessionSupport::PermissionDenied, "PermissionDenied"),
        (SessionSupport::InsecureContext, "InsecureContext"),
    ] {
        let (platform, log) = MockPlatform::with_support(support);
        let mut sessions = SessionManager::new(platform);

        let err = sessions.start().unwrap_err();
        assert!(err.is_capability_error());
        assert!(format!("{err:?}").starts_with(expected));
        assert_eq!(log.borrow().calls, vec![Call::Probe]);
        assert!(!support.status_message().is_empty());
    }
}

#[test]
fn null_platform_is_unsupported() {
    let mut sessions = SessionManager::new(NullPlatform);
    assert_eq!(sessions.probe(), SessionSupport::Unsupported);
    assert!(matches!(sessions.start(), Err(PlacementError::TrackingUnsupported)));
    assert!(sessions.hit_test(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).is_empty());
}

// ============================================================================
// Teardown & hit testing
// ============================================================================

#[test]
fn drop_releases_exactly_once() {
    let (platform, log) = MockPlatform::supported();
    {
        let mut sessions = SessionManager::new(platform);
        sessions.start().unwrap();
    }

    let log = log.borrow();
    assert_eq!(log.releases(), vec![Call::ReleaseSource(2), Call::ReleaseFrame(1)]);
    assert_eq!(log.count(&Call::EndSession), 1);
}

#[test]
fn drop_after_end_releases_nothing_more() {
    let (platform, log) = MockPlatform::supported();
    {
        let mut sessions = SessionManager::new(platform);
        sessions.start().unwrap();
        sessions.end(EndReason::User);
    }
    assert_eq!(log.borrow().releases().len(), 2);
    assert_eq!(log.borrow().count(&Call::EndSession), 1);
}

#[test]
fn hit_test_requires_a_session() {
    let (platform, log) = MockPlatform::supported();
    log.borrow_mut().hits.push(HitPose {
        position: Vec3::new(0.0, 0.0, -1.0),
        orientation: Quat::IDENTITY,
    });
    let mut sessions = SessionManager::new(platform);
    let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

    assert!(sessions.hit_test(&ray).is_empty());
    assert_eq!(log.borrow().count(&Call::HitTest), 0);

    sessions.start().unwrap();
    let hits = sessions.hit_test(&ray);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].normal(), Vec3::Y);
}
