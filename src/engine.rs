//! Engine façade
//!
//! [`PlacementEngine`] wires the resource cache, the surface detector, the
//! placement state machine and the session manager into a frame loop driven
//! from outside:
//!
//! ```rust,ignore
//! let mut engine = PlacementEngine::new(NullPlatform, EngineConfig::default())?;
//! runtime.spawn(engine.select_asset("models/chair.glb", ModelFormat::Portable));
//!
//! loop {
//!     let output = engine.tick(&Ray::from_pose(camera_pos, camera_rot));
//!     if user_tapped {
//!         engine.commit();
//!     }
//! }
//! ```
//!
//! Loads complete on whatever executor runs the returned futures and are
//! applied at the start of the next [`PlacementEngine::tick`]. A load that
//! finishes after a newer selection is discarded.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::assets::{Diagnostic, ModelFormat, ModelResource, ResourceCache};
use crate::config::EngineConfig;
use crate::detection::{DetectionContext, DetectorBackend, HitCandidate, PlacementMode, SurfaceDetector};
use crate::errors::Result;
use crate::math::Ray;
use crate::placement::{PlacementEvent, PlacementMachine, PlacementPhase, PlacementResult};
use crate::scene::{ObjectKey, Scene, Transform};
use crate::session::{EndReason, SessionManager, SessionSupport, SpatialPlatform};

/// Completed load tagged with the selection it belongs to.
struct LoadCompletion {
    generation: u64,
    resource: Arc<ModelResource>,
}

/// Everything the UI and renderer need after a frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub frame: u64,
    pub phase: PlacementPhase,
    /// Live candidate while `Valid`
    pub preview: Option<HitCandidate>,
    /// Committed placement while `Placed`
    pub placement: Option<PlacementResult>,
    pub events: Vec<PlacementEvent>,
    /// Resource that became active this frame
    pub loaded: Option<Arc<ModelResource>>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct PlacementEngine<P: SpatialPlatform> {
    config: EngineConfig,
    cache: ResourceCache,
    sessions: SessionManager<P>,
    detector: SurfaceDetector,
    machine: PlacementMachine,
    scene: Scene,

    support: SessionSupport,
    status: String,

    generation: u64,
    selected_url: Option<String>,
    inbox_tx: flume::Sender<LoadCompletion>,
    inbox_rx: flume::Receiver<LoadCompletion>,
    diagnostics: flume::Receiver<Diagnostic>,

    active_resource: Option<Arc<ModelResource>>,
    placed_object: Option<ObjectKey>,
}

impl<P: SpatialPlatform> PlacementEngine<P> {
    /// Validates `config` and probes the platform once.
    pub fn new(platform: P, config: EngineConfig) -> Result<Self> {
        let cache = ResourceCache::new(config.loader.clone());
        Self::with_cache(platform, config, cache)
    }

    /// Like [`Self::new`] with a caller-provided cache (e.g. shared between
    /// views or using a custom decoder).
    pub fn with_cache(platform: P, config: EngineConfig, cache: ResourceCache) -> Result<Self> {
        config.validate()?;

        let mut sessions = SessionManager::new(platform);
        let support = sessions.probe();
        let (inbox_tx, inbox_rx) = flume::unbounded();
        let diagnostics = cache.diagnostics();

        Ok(Self {
            detector: SurfaceDetector::heuristic(&config.detector),
            config,
            cache,
            sessions,
            machine: PlacementMachine::default(),
            scene: Scene::new(),
            support,
            status: support.status_message().to_string(),
            generation: 0,
            selected_url: None,
            inbox_tx,
            inbox_rx,
            diagnostics,
            active_resource: None,
            placed_object: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Scene geometry the heuristic detector casts against in wall mode.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn support(&self) -> SessionSupport {
        self.support
    }

    /// Latest status line for the UI.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[must_use]
    pub fn detector_backend(&self) -> DetectorBackend {
        self.detector.backend()
    }

    #[must_use]
    pub fn is_session_active(&self) -> bool {
        self.sessions.is_active()
    }

    #[must_use]
    pub fn platform(&self) -> &P {
        self.sessions.platform()
    }

    #[must_use]
    pub fn mode(&self) -> PlacementMode {
        self.machine.mode()
    }

    #[must_use]
    pub fn phase(&self) -> PlacementPhase {
        self.machine.phase()
    }

    #[must_use]
    pub fn placement(&self) -> Option<&PlacementResult> {
        self.machine.placement()
    }

    #[must_use]
    pub fn active_resource(&self) -> Option<&Arc<ModelResource>> {
        self.active_resource.as_ref()
    }

    #[must_use]
    pub fn selected_url(&self) -> Option<&str> {
        self.selected_url.as_deref()
    }

    /// Scene object of the committed model, if any.
    #[must_use]
    pub fn placed_object(&self) -> Option<ObjectKey> {
        self.placed_object
    }

    pub fn set_on_placed(&mut self, callback: impl FnMut(&PlacementResult) + 'static) {
        self.machine.set_on_placed(callback);
    }

    // ========================================================================
    // Asset selection
    // ========================================================================

    /// Selects a model. Any earlier selection still loading becomes stale.
    ///
    /// The returned future performs the load and posts the result to the
    /// engine; run it on any executor. The resource becomes active on the
    /// first [`Self::tick`] after it completes.
    pub fn select_asset(&mut self, url: &str, format: ModelFormat) -> BoxFuture<'static, ()> {
        self.generation += 1;
        self.selected_url = Some(url.to_string());
        log::info!("Selected {url} (generation {})", self.generation);

        let generation = self.generation;
        let load = self.cache.load(url, format);
        let inbox = self.inbox_tx.clone();
        async move {
            let resource = load.await;
            // The engine may be gone already.
            let _ = inbox.send(LoadCompletion { generation, resource });
        }
        .boxed()
    }

    /// Validates an uploaded file, registers it and selects it.
    pub fn select_upload(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<BoxFuture<'static, ()>> {
        let ticket = self.cache.upload(file_name, bytes)?;
        Ok(self.select_asset(&ticket.url, ticket.format))
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Runs one frame: applies finished loads, detects, advances the state
    /// machine.
    pub fn tick(&mut self, ray: &Ray) -> FrameOutput {
        let loaded = self.apply_completed_loads();
        let diagnostics: Vec<Diagnostic> = self.diagnostics.try_iter().collect();

        let candidate = if self.machine.phase() == PlacementPhase::Placed {
            None
        } else {
            self.detector.detect(
                ray,
                self.machine.mode(),
                DetectionContext {
                    sessions: &mut self.sessions,
                    scene: &self.scene,
                },
            )
        };

        let phase = self.machine.advance_frame(candidate);

        FrameOutput {
            frame: self.machine.frame(),
            phase,
            preview: self.machine.preview().copied(),
            placement: self.machine.placement().copied(),
            events: self.machine.drain_events(),
            loaded,
            diagnostics,
        }
    }

    fn apply_completed_loads(&mut self) -> Option<Arc<ModelResource>> {
        let mut applied = None;
        for completion in self.inbox_rx.try_iter() {
            if completion.generation != self.generation {
                log::debug!(
                    "Discarding stale load of {} (generation {} < {})",
                    completion.resource.source_url(),
                    completion.generation,
                    self.generation
                );
                continue;
            }
            applied = Some(completion.resource);
        }

        let resource = applied?;
        self.active_resource = Some(resource.clone());

        // Keep an existing placement, showing the new model in its place.
        if let Some(result) = self.machine.placement().copied() {
            self.remove_placed_object();
            self.insert_placed_object(&resource, &result);
        }
        Some(resource)
    }

    // ========================================================================
    // User intents
    // ========================================================================

    /// Commits the live candidate. Needs an active resource and a `Valid`
    /// state; otherwise nothing happens.
    pub fn commit(&mut self) -> Option<PlacementResult> {
        let Some(resource) = self.active_resource.clone() else {
            log::debug!("Commit ignored: no model loaded");
            return None;
        };

        let result = self.machine.commit()?;
        self.insert_placed_object(&resource, &result);
        Some(result)
    }

    pub fn reset(&mut self) {
        self.machine.reset();
        self.remove_placed_object();
    }

    pub fn toggle_mode(&mut self) -> PlacementMode {
        let mode = self.machine.toggle_mode();
        self.remove_placed_object();
        mode
    }

    pub fn set_mode(&mut self, mode: PlacementMode) {
        if self.machine.set_mode(mode) {
            self.remove_placed_object();
        }
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Starts tracking and switches to the native detector.
    ///
    /// Capability failures leave the engine in heuristic mode with a status
    /// message; the error is returned as well.
    pub fn start_session(&mut self) -> Result<()> {
        match self.sessions.start() {
            Ok(_) => {
                self.detector = SurfaceDetector::native();
                self.status = "AR session active. Move your device to find a surface.".to_string();
                Ok(())
            }
            Err(e) => {
                log::warn!("Could not start tracking session: {e}");
                self.status = if e.is_capability_error() {
                    self.support.status_message().to_string()
                } else {
                    format!("Failed to start AR: {e}")
                };
                Err(e)
            }
        }
    }

    /// User-initiated end.
    pub fn end_session(&mut self) {
        self.finish_session(EndReason::User);
    }

    /// The platform ended the session on its own.
    pub fn on_platform_session_ended(&mut self) {
        self.finish_session(EndReason::Platform);
    }

    /// Ends the session after a frame-loop error.
    pub fn abort_session(&mut self) {
        self.finish_session(EndReason::Error);
    }

    fn finish_session(&mut self, reason: EndReason) {
        if !self.sessions.end(reason) {
            return;
        }
        self.machine.session_ended();
        self.remove_placed_object();
        self.detector = SurfaceDetector::heuristic(&self.config.detector);
        self.status = "AR session ended.".to_string();
    }

    // ========================================================================
    // Scene sync
    // ========================================================================

    fn insert_placed_object(&mut self, resource: &ModelResource, result: &PlacementResult) {
        let mut instance = resource.instantiate();
        instance.transform = Transform::from_position_rotation(result.position, result.orientation);
        self.placed_object = Some(self.scene.add(instance.into_scene_object()));
    }

    fn remove_placed_object(&mut self) {
        if let Some(key) = self.placed_object.take() {
            self.scene.remove(key);
        }
    }
}

impl<P: SpatialPlatform> Drop for PlacementEngine<P> {
    fn drop(&mut self) {
        self.finish_session(EndReason::Teardown);
    }
}
