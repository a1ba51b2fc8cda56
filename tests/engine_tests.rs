//! Engine Tests
//!
//! Tests for:
//! - Select -> load -> detect -> commit flow on both backends
//! - Stale load discarding
//! - Scene sync of the placed object
//! - Session start/end effects on detector backend and placement
//! - Teardown on drop

mod common;

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec3};

use common::{Call, CountingDecoder, MockPlatform, init_logger, triangle_glb, vec3_approx};
use myth_placement::assets::{FallbackKind, ModelFormat, ResourceCache};
use myth_placement::config::{EngineConfig, LoaderConfig};
use myth_placement::detection::{DetectorBackend, PlacementMode, SurfaceType};
use myth_placement::engine::PlacementEngine;
use myth_placement::math::Ray;
use myth_placement::placement::{ClearReason, PlacementEvent, PlacementPhase};
use myth_placement::scene::{Geometry, Material, Mesh, ModelGraph, SceneObject, Transform};
use myth_placement::session::{HitPose, NullPlatform, SessionSupport};

fn floor_ray() -> Ray {
    Ray::new(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, -1.0, -1.0))
}

fn desktop_engine() -> PlacementEngine<NullPlatform> {
    let cache = ResourceCache::new(LoaderConfig::default());
    cache.blobs().insert("a.glb", triangle_glb());
    cache.blobs().insert("b.glb", triangle_glb());
    PlacementEngine::with_cache(NullPlatform, EngineConfig::default(), cache).unwrap()
}

// ============================================================================
// Desktop (heuristic) flow
// ============================================================================

#[test]
fn select_detect_commit_on_floor() {
    init_logger();
    let mut engine = desktop_engine();
    assert_eq!(engine.support(), SessionSupport::Unsupported);
    assert_eq!(engine.detector_backend(), DetectorBackend::Heuristic);

    pollster::block_on(engine.select_asset("a.glb", ModelFormat::Portable));

    let frame = engine.tick(&floor_ray());
    let loaded = frame.loaded.expect("load applied on tick");
    assert!(!loaded.is_fallback());
    assert!(loaded.metrics().vertex_count > 0);
    assert_eq!(frame.phase, PlacementPhase::Valid);
    assert_eq!(frame.preview.unwrap().surface_type(), SurfaceType::Floor);

    let result = engine.commit().unwrap();
    assert_eq!(result.surface_type, SurfaceType::Floor);
    assert!(vec3_approx(result.position, Vec3::new(0.0, 0.0, -1.6)));

    let key = engine.placed_object().unwrap();
    let object = engine.scene().get(key).unwrap();
    assert!(!object.pickable);
    assert!(vec3_approx(object.transform.position, result.position));

    let frame = engine.tick(&floor_ray());
    assert_eq!(frame.phase, PlacementPhase::Placed);
    assert!(frame.events.iter().any(|e| matches!(e, PlacementEvent::Committed(_))));
    assert_eq!(frame.placement.unwrap().surface_type, SurfaceType::Floor);
}

#[test]
fn commit_requires_a_loaded_model() {
    let mut engine = desktop_engine();
    let frame = engine.tick(&floor_ray());
    assert_eq!(frame.phase, PlacementPhase::Valid);

    assert!(engine.commit().is_none());
    assert_eq!(engine.phase(), PlacementPhase::Valid);
    assert!(engine.scene().is_empty());
}

#[test]
fn wall_mode_uses_scene_geometry() {
    let mut engine = desktop_engine();
    pollster::block_on(engine.select_asset("a.glb", ModelFormat::Portable));

    let wall = Mesh::new(Arc::new(Geometry::new_plane(4.0, 3.0)), Material::default());
    engine.scene_mut().add(
        SceneObject::new("wall", ModelGraph::from_mesh(wall))
            .with_transform(Transform::from_position_rotation(Vec3::new(0.0, 1.5, -3.0), Quat::IDENTITY)),
    );
    engine.set_mode(PlacementMode::Wall);

    let ray = Ray::new(Vec3::new(0.4, 1.2, 0.0), Vec3::NEG_Z);
    let frame = engine.tick(&ray);
    assert_eq!(frame.preview.unwrap().surface_type(), SurfaceType::Wall);

    let result = engine.commit().unwrap();
    assert_eq!(result.surface_type, SurfaceType::Wall);
    assert!(vec3_approx(result.orientation * Vec3::Z, Vec3::Z));

    // The placed model is not a wall candidate itself.
    assert_eq!(engine.scene().len(), 2);
    engine.reset();
    assert_eq!(engine.scene().len(), 1);
    let frame = engine.tick(&ray);
    assert!((frame.preview.unwrap().source_distance() - 3.0).abs() < 1e-4);
}

#[test]
fn toggle_while_placed_clears_placement() {
    let mut engine = desktop_engine();
    pollster::block_on(engine.select_asset("a.glb", ModelFormat::Portable));
    engine.tick(&floor_ray());
    engine.commit().unwrap();
    engine.tick(&floor_ray());

    assert_eq!(engine.toggle_mode(), PlacementMode::Wall);

    assert_eq!(engine.phase(), PlacementPhase::Searching);
    assert!(engine.placement().is_none());
    assert!(engine.placed_object().is_none());
    assert!(engine.scene().is_empty());

    let frame = engine.tick(&floor_ray());
    assert!(frame.events.contains(&PlacementEvent::Cleared {
        reason: ClearReason::ModeChanged
    }));
    // Floor-only view in wall mode: nothing to place on.
    assert_eq!(frame.phase, PlacementPhase::Searching);
}

// ============================================================================
// Asset selection
// ============================================================================

#[test]
fn stale_load_is_discarded() {
    let mut engine = desktop_engine();

    let first = engine.select_asset("a.glb", ModelFormat::Portable);
    let second = engine.select_asset("b.glb", ModelFormat::Portable);

    // The newer selection finishes first, the older one afterwards.
    pollster::block_on(second);
    pollster::block_on(first);

    let frame = engine.tick(&floor_ray());
    assert_eq!(frame.loaded.unwrap().source_url(), "b.glb");
    assert_eq!(engine.active_resource().unwrap().source_url(), "b.glb");
    assert_eq!(engine.selected_url(), Some("b.glb"));
}

#[test]
fn stale_load_alone_changes_nothing() {
    let mut engine = desktop_engine();

    let first = engine.select_asset("a.glb", ModelFormat::Portable);
    let _second = engine.select_asset("b.glb", ModelFormat::Portable);
    pollster::block_on(first);

    let frame = engine.tick(&floor_ray());
    assert!(frame.loaded.is_none());
    assert!(engine.active_resource().is_none());
}

#[test]
fn reselecting_while_placed_swaps_the_model() {
    let mut engine = desktop_engine();
    pollster::block_on(engine.select_asset("a.glb", ModelFormat::Portable));
    engine.tick(&floor_ray());
    let result = engine.commit().unwrap();
    let old_key = engine.placed_object().unwrap();

    pollster::block_on(engine.select_asset("b.glb", ModelFormat::Portable));
    engine.tick(&floor_ray());

    let new_key = engine.placed_object().unwrap();
    assert_ne!(old_key, new_key);
    assert_eq!(engine.scene().len(), 1);
    assert_eq!(engine.scene().get(new_key).unwrap().name, "b.glb");
    assert_eq!(engine.placement().unwrap().position, result.position);
}

#[test]
fn same_url_is_decoded_once_across_selections() {
    let decoder = CountingDecoder::new();
    let cache = ResourceCache::with_decoder(LoaderConfig::default(), decoder.clone());
    cache.blobs().insert("a.glb", triangle_glb());
    let mut engine = PlacementEngine::with_cache(NullPlatform, EngineConfig::default(), cache).unwrap();

    pollster::block_on(engine.select_asset("a.glb", ModelFormat::Portable));
    pollster::block_on(engine.select_asset("a.glb", ModelFormat::Portable));
    engine.tick(&floor_ray());

    assert_eq!(decoder.count(), 1);
}

#[test]
fn failed_load_reports_a_diagnostic() {
    let mut engine = desktop_engine();
    pollster::block_on(engine.select_asset("blob:missing/sofa.glb", ModelFormat::Portable));

    let frame = engine.tick(&floor_ray());

    assert!(frame.loaded.unwrap().is_fallback());
    assert_eq!(frame.diagnostics.len(), 1);
    assert_eq!(frame.diagnostics[0].kind, FallbackKind::LoadFailed);
}

#[test]
fn upload_is_validated_before_loading() {
    let mut engine = desktop_engine();

    assert!(engine.select_upload("chair.obj", vec![1, 2, 3]).is_err());
    assert!(engine.selected_url().is_none());

    let load = engine.select_upload("chair.glb", triangle_glb()).unwrap();
    pollster::block_on(load);
    let frame = engine.tick(&floor_ray());
    assert!(!frame.loaded.unwrap().is_fallback());
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = EngineConfig::default();
    config.detector.max_distance = -1.0;
    assert!(PlacementEngine::new(NullPlatform, config).is_err());
}

// ============================================================================
// Native flow & session lifecycle
// ============================================================================

fn native_engine() -> (PlacementEngine<MockPlatform>, std::rc::Rc<std::cell::RefCell<common::PlatformLog>>) {
    let (platform, log) = MockPlatform::supported();
    log.borrow_mut().hits = vec![
        HitPose {
            position: Vec3::new(0.5, 0.0, -2.0),
            orientation: Quat::IDENTITY,
        },
        HitPose {
            position: Vec3::new(0.0, 1.0, -3.0),
            orientation: Quat::from_rotation_x(FRAC_PI_2),
        },
    ];
    let cache = ResourceCache::new(LoaderConfig::default());
    cache.blobs().insert("a.glb", triangle_glb());
    let engine = PlacementEngine::with_cache(platform, EngineConfig::default(), cache).unwrap();
    (engine, log)
}

#[test]
fn session_switches_to_native_backend() {
    let (mut engine, log) = native_engine();
    assert_eq!(engine.support(), SessionSupport::Supported);
    assert_eq!(engine.detector_backend(), DetectorBackend::Heuristic);

    engine.start_session().unwrap();
    assert!(engine.is_session_active());
    assert_eq!(engine.detector_backend(), DetectorBackend::Native);

    pollster::block_on(engine.select_asset("a.glb", ModelFormat::Portable));
    let ray = Ray::new(Vec3::new(0.0, 1.6, 0.0), Vec3::NEG_Z);
    let frame = engine.tick(&ray);
    assert!(vec3_approx(frame.preview.unwrap().point(), Vec3::new(0.5, 0.0, -2.0)));
    assert!(log.borrow().count(&Call::HitTest) >= 1);

    engine.toggle_mode();
    let frame = engine.tick(&ray);
    assert_eq!(frame.preview.unwrap().surface_type(), SurfaceType::Wall);
}

#[test]
fn session_end_returns_to_searching_and_releases_once() {
    let (mut engine, log) = native_engine();
    engine.start_session().unwrap();
    pollster::block_on(engine.select_asset("a.glb", ModelFormat::Portable));
    let ray = Ray::new(Vec3::new(0.0, 1.6, 0.0), Vec3::NEG_Z);
    engine.tick(&ray);
    engine.commit().unwrap();

    engine.on_platform_session_ended();

    assert_eq!(engine.phase(), PlacementPhase::Searching);
    assert!(engine.placement().is_none());
    assert!(engine.scene().is_empty());
    assert_eq!(engine.detector_backend(), DetectorBackend::Heuristic);
    assert_eq!(log.borrow().releases(), vec![Call::ReleaseSource(2), Call::ReleaseFrame(1)]);

    engine.end_session();
    drop(engine);
    assert_eq!(log.borrow().releases().len(), 2);
    assert_eq!(log.borrow().count(&Call::EndSession), 0);
}

#[test]
fn dropping_the_engine_tears_the_session_down() {
    let (mut engine, log) = native_engine();
    engine.start_session().unwrap();
    drop(engine);

    let log = log.borrow();
    assert_eq!(log.releases(), vec![Call::ReleaseSource(2), Call::ReleaseFrame(1)]);
    assert_eq!(log.count(&Call::EndSession), 1);
}

#[test]
fn unsupported_platform_keeps_heuristic_mode() {
    let (platform, _log) = MockPlatform::with_support(SessionSupport::PermissionDenied);
    let mut engine = PlacementEngine::new(platform, EngineConfig::default()).unwrap();

    let err = engine.start_session().unwrap_err();
    assert!(err.is_capability_error());
    assert_eq!(engine.status(), SessionSupport::PermissionDenied.status_message());
    assert_eq!(engine.detector_backend(), DetectorBackend::Heuristic);

    let frame = engine.tick(&floor_ray());
    assert_eq!(frame.phase, PlacementPhase::Valid);
}
