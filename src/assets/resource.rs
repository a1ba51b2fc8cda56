use uuid::Uuid;

use crate::assets::decoder::DecodedModel;
use crate::assets::fallback::fallback_graph;
use crate::assets::format::ModelFormat;
use crate::assets::metrics::ModelMetrics;
use crate::assets::post_process::post_process;
use crate::config::LoaderConfig;
use crate::scene::{ModelGraph, SceneObject, Transform};

/// Named animation of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds
    pub duration: f32,
}

/// Why a load ended in a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// Reading or decoding failed.
    LoadFailed,
    /// The format has no decoder.
    UnsupportedFormat,
}

/// Decision taken once at the cache boundary: either a decoded model or a
/// placeholder with the reason.
#[derive(Debug)]
pub enum DecodeOutcome {
    Decoded(DecodedModel),
    Fallback { kind: FallbackKind, reason: String },
}

/// Resolved result of a load, shared by every consumer of the same URL.
///
/// Never mutated after construction. Consumers that insert the model into a
/// live scene take their own copy through [`ModelResource::instantiate`].
#[derive(Debug)]
pub struct ModelResource {
    id: Uuid,
    source_url: String,
    format: ModelFormat,
    root: ModelGraph,
    animations: Vec<AnimationClip>,
    metrics: ModelMetrics,
    fallback: Option<(FallbackKind, String)>,
}

impl ModelResource {
    /// Post-processes the outcome and computes metrics.
    #[must_use]
    pub fn build(source_url: impl Into<String>, format: ModelFormat, outcome: DecodeOutcome, config: &LoaderConfig) -> Self {
        let (mut root, animations, fallback) = match outcome {
            DecodeOutcome::Decoded(model) => (model.graph, model.animations, None),
            DecodeOutcome::Fallback { kind, reason } => (fallback_graph(), Vec::new(), Some((kind, reason))),
        };

        post_process(&mut root, config);
        let metrics = ModelMetrics::collect(&root, &animations);

        Self {
            id: Uuid::new_v4(),
            source_url: source_url.into(),
            format,
            root,
            animations,
            metrics,
            fallback,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> ModelFormat {
        self.format
    }

    /// Shared, read-only graph.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &ModelGraph {
        &self.root
    }

    #[inline]
    #[must_use]
    pub fn animations(&self) -> &[AnimationClip] {
        &self.animations
    }

    #[inline]
    #[must_use]
    pub fn metrics(&self) -> ModelMetrics {
        self.metrics
    }

    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    #[must_use]
    pub fn fallback_kind(&self) -> Option<FallbackKind> {
        self.fallback.as_ref().map(|(kind, _)| *kind)
    }

    #[must_use]
    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback.as_ref().map(|(_, reason)| reason.as_str())
    }

    /// Independent copy of the graph and animations for scene insertion.
    #[must_use]
    pub fn instantiate(&self) -> ModelInstance {
        ModelInstance {
            source_url: self.source_url.clone(),
            graph: self.root.clone(),
            animations: self.animations.clone(),
            transform: Transform::new(),
        }
    }

    /// Thumbnail copy: uniformly scaled by `size`, animations stripped.
    #[must_use]
    pub fn preview(&self, size: f32) -> ModelInstance {
        let mut instance = self.instantiate();
        instance.animations.clear();
        instance.transform.scale = glam::Vec3::splat(size);
        instance
    }
}

/// Exclusively owned copy of a [`ModelResource`].
#[derive(Debug, Clone)]
pub struct ModelInstance {
    pub source_url: String,
    pub graph: ModelGraph,
    pub animations: Vec<AnimationClip>,
    pub transform: Transform,
}

impl ModelInstance {
    /// Converts into a non-pickable scene object, so that ray casts for
    /// placement do not hit the placed model itself.
    #[must_use]
    pub fn into_scene_object(self) -> SceneObject {
        let mut object = SceneObject::new(self.source_url, self.graph).with_transform(self.transform);
        object.pickable = false;
        object
    }
}
