use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::assets::decoder::{GltfDecoder, ModelDecoder};
use crate::assets::format::ModelFormat;
use crate::assets::io::{AssetReaderVariant, BlobStore};
use crate::assets::resource::{DecodeOutcome, FallbackKind, ModelResource};
use crate::assets::validation::validate_model_file;
use crate::config::LoaderConfig;
use crate::errors::{PlacementError, Result};

/// Capacity of the diagnostics channel. Older undelivered entries are kept
/// and new ones dropped once it is full.
const DIAGNOSTICS_CAPACITY: usize = 64;

/// URL prefix of uploaded files.
const UPLOAD_PREFIX: &str = "blob:";

/// Handle to a (possibly pending) load. Clones resolve to the same
/// `Arc<ModelResource>`.
pub type LoadFuture = Shared<BoxFuture<'static, Arc<ModelResource>>>;

/// Out-of-band report of a load that degraded to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub url: String,
    pub kind: FallbackKind,
    pub message: String,
}

/// Result of registering an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    /// URL to pass to [`ResourceCache::load`]
    pub url: String,
    pub format: ModelFormat,
}

struct CacheInner {
    entries: Mutex<FxHashMap<String, LoadFuture>>,
    decoder: Arc<dyn ModelDecoder>,
    config: LoaderConfig,
    blobs: BlobStore,
    diagnostics_tx: flume::Sender<Diagnostic>,
    diagnostics_rx: flume::Receiver<Diagnostic>,
}

/// Deduplicating model cache
///
/// Every URL maps to one shared load future. Concurrent and later requests
/// for the same URL await that future and receive the same
/// `Arc<ModelResource>`. Loads never fail: errors turn into a placeholder
/// model plus a [`Diagnostic`].
///
/// Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct ResourceCache {
    inner: Arc<CacheInner>,
}

impl ResourceCache {
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_decoder(config, Arc::new(GltfDecoder))
    }

    #[must_use]
    pub fn with_decoder(config: LoaderConfig, decoder: Arc<dyn ModelDecoder>) -> Self {
        let (diagnostics_tx, diagnostics_rx) = flume::bounded(DIAGNOSTICS_CAPACITY);
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(FxHashMap::default()),
                decoder,
                config,
                blobs: BlobStore::new(),
                diagnostics_tx,
                diagnostics_rx,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn blobs(&self) -> &BlobStore {
        &self.inner.blobs
    }

    /// Receiver for load diagnostics. Receivers share one queue, so each
    /// diagnostic is delivered to a single receiver.
    #[must_use]
    pub fn diagnostics(&self) -> flume::Receiver<Diagnostic> {
        self.inner.diagnostics_rx.clone()
    }

    /// Resolves `url` to a model.
    ///
    /// The first request for a URL decides its format; later requests share
    /// that load regardless of the `format` they pass. The returned future
    /// owns everything it needs and can be spawned or awaited from any
    /// executor.
    pub fn load(&self, url: &str, format: ModelFormat) -> LoadFuture {
        let mut entries = self.inner.entries.lock();
        if let Some(pending) = entries.get(url) {
            log::debug!("Joining existing load for {url}");
            return pending.clone();
        }

        log::debug!("Starting {format} load for {url}");
        let load = Self::resolve(self.inner.clone(), url.to_string(), format)
            .boxed()
            .shared();
        entries.insert(url.to_string(), load.clone());
        load
    }

    /// Validates an uploaded file and registers its bytes under a fresh
    /// `blob:` URL.
    ///
    /// The bytes are released as soon as the first load of that URL has
    /// resolved; the resolved model stays cached until evicted.
    pub fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadTicket> {
        let format = validate_model_file(file_name, bytes.len() as u64, &self.inner.config)?;
        let url = format!("{UPLOAD_PREFIX}{}/{}", Uuid::new_v4(), file_name);
        self.inner.blobs.insert(url.clone(), bytes);
        log::info!("Registered upload {file_name} as {url}");
        Ok(UploadTicket { url, format })
    }

    /// Resolved resource for `url`, if its load has completed.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<Arc<ModelResource>> {
        self.inner.entries.lock().get(url).and_then(Shared::peek).cloned()
    }

    #[must_use]
    pub fn is_loading(&self, url: &str) -> bool {
        self.inner
            .entries
            .lock()
            .get(url)
            .is_some_and(|load| load.peek().is_none())
    }

    /// Forgets `url`. Pending callers still receive their result; the next
    /// request starts a new load.
    pub fn evict(&self, url: &str) -> bool {
        self.inner.blobs.remove(url);
        self.inner.entries.lock().remove(url).is_some()
    }

    /// Forgets every entry and every registered blob.
    pub fn clear(&self) {
        self.inner.entries.lock().clear();
        self.inner.blobs.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }

    async fn resolve(inner: Arc<CacheInner>, url: String, format: ModelFormat) -> Arc<ModelResource> {
        let resource = match format {
            ModelFormat::Container => {
                let outcome = DecodeOutcome::Fallback {
                    kind: FallbackKind::UnsupportedFormat,
                    reason: format!("{format} models cannot be decoded here; showing a placeholder"),
                };
                ModelResource::build(url.as_str(), format, outcome, &inner.config)
            }
            ModelFormat::Portable => match Self::read(&inner, &url).await {
                Ok(bytes) => Self::decode(&inner, url.clone(), format, bytes).await,
                Err(e) => {
                    let outcome = DecodeOutcome::Fallback {
                        kind: FallbackKind::LoadFailed,
                        reason: e.to_string(),
                    };
                    ModelResource::build(url.as_str(), format, outcome, &inner.config)
                }
            },
        };

        if url.starts_with(UPLOAD_PREFIX) && inner.blobs.remove(&url).is_some() {
            log::debug!("Released upload bytes of {url}");
        }

        if let (Some(kind), Some(reason)) = (resource.fallback_kind(), resource.fallback_reason()) {
            log::warn!("Using placeholder for {url}: {reason}");
            let diagnostic = Diagnostic {
                url: url.clone(),
                kind,
                message: reason.to_string(),
            };
            if inner.diagnostics_tx.try_send(diagnostic).is_err() {
                log::debug!("Diagnostics queue full, dropping report for {url}");
            }
        } else {
            let m = resource.metrics();
            log::info!(
                "Loaded {url}: {} vertices, {} faces, {} materials, {} animations",
                m.vertex_count,
                m.face_count,
                m.material_count,
                m.animation_count
            );
        }

        Arc::new(resource)
    }

    async fn read(inner: &CacheInner, url: &str) -> Result<Vec<u8>> {
        let reader = AssetReaderVariant::for_url(url, &inner.blobs)?;
        reader.read_bytes(url).await
    }

    /// Decodes on a blocking worker when a tokio runtime is available,
    /// inline otherwise.
    async fn decode(inner: &Arc<CacheInner>, url: String, format: ModelFormat, bytes: Vec<u8>) -> ModelResource {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let worker = inner.clone();
                let worker_url = url.clone();
                let joined = handle
                    .spawn_blocking(move || Self::decode_cpu(&worker, worker_url, format, &bytes))
                    .await
                    .map_err(PlacementError::from);
                return match joined {
                    Ok(resource) => resource,
                    Err(e) => Self::failed(inner, url, format, &e),
                };
            }
        }

        Self::decode_cpu(inner, url, format, &bytes)
    }

    fn decode_cpu(inner: &CacheInner, url: String, format: ModelFormat, bytes: &[u8]) -> ModelResource {
        let outcome = match inner.decoder.decode(bytes) {
            Ok(model) if model.graph.has_geometry() => DecodeOutcome::Decoded(model),
            Ok(_) => DecodeOutcome::Fallback {
                kind: FallbackKind::LoadFailed,
                reason: PlacementError::EmptyModel(url.clone()).to_string(),
            },
            Err(e) => DecodeOutcome::Fallback {
                kind: FallbackKind::LoadFailed,
                reason: e.to_string(),
            },
        };
        ModelResource::build(url, format, outcome, &inner.config)
    }

    fn failed(inner: &CacheInner, url: String, format: ModelFormat, error: &PlacementError) -> ModelResource {
        let outcome = DecodeOutcome::Fallback {
            kind: FallbackKind::LoadFailed,
            reason: error.to_string(),
        };
        ModelResource::build(url, format, outcome, &inner.config)
    }
}
