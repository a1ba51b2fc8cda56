use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::{PlacementError, Result};

/// Asset reader trait
///
/// Asynchronously fetches the raw bytes behind a model URL.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// In-memory blobs registered by upload-style entry points, keyed by the
/// URL they were registered under.
#[derive(Clone, Default)]
pub struct BlobStore {
    inner: Arc<RwLock<FxHashMap<String, Arc<[u8]>>>>,
}

impl BlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.inner.write().insert(url.into(), bytes.into());
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<Arc<[u8]>> {
        self.inner.read().get(url).cloned()
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.inner.read().contains_key(url)
    }

    pub fn remove(&self, url: &str) -> Option<Arc<[u8]>> {
        self.inner.write().remove(url)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Local file reader
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FileAssetReader;

#[cfg(not(target_arch = "wasm32"))]
impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        match tokio::fs::read(path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PlacementError::AssetNotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Reader over the [`BlobStore`]
pub struct MemoryAssetReader {
    blobs: BlobStore,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.blobs
            .get(uri)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| PlacementError::AssetNotFound(uri.to_string()))
    }
}

/// HTTP reader
#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
#[derive(Debug, Default)]
pub struct HttpAssetReader;

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
impl AssetReader for HttpAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let request = ehttp::Request::get(uri);
        let response = ehttp::fetch_async(request)
            .await
            .map_err(PlacementError::HttpError)?;

        if !response.ok {
            return Err(PlacementError::HttpResponseError {
                status: response.status,
            });
        }
        Ok(response.bytes)
    }
}

/// Reader variants
///
/// An enum instead of a trait object: the set of sources is closed and the
/// futures stay `Send` without boxing.
pub enum AssetReaderVariant {
    #[cfg(not(target_arch = "wasm32"))]
    File(FileAssetReader),
    Memory(MemoryAssetReader),
    #[cfg(all(feature = "http", not(target_arch = "wasm32")))]
    Http(HttpAssetReader),
}

impl AssetReaderVariant {
    /// Picks the reader for `url`: registered blobs first, then by scheme.
    pub fn for_url(url: &str, blobs: &BlobStore) -> Result<Self> {
        if blobs.contains(url) || url.starts_with("blob:") {
            return Ok(Self::Memory(MemoryAssetReader::new(blobs.clone())));
        }

        if url.starts_with("http://") || url.starts_with("https://") {
            #[cfg(all(feature = "http", not(target_arch = "wasm32")))]
            {
                return Ok(Self::Http(HttpAssetReader));
            }
            #[cfg(not(all(feature = "http", not(target_arch = "wasm32"))))]
            {
                return Err(PlacementError::FeatureNotEnabled(
                    "HTTP reader. Enable it with `features = [\"http\"]`".to_string(),
                ));
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(Self::File(FileAssetReader))
        }
        #[cfg(target_arch = "wasm32")]
        {
            Err(PlacementError::AssetNotFound(url.to_string()))
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Self::File(r) => r.read_bytes(uri).await,
            Self::Memory(r) => r.read_bytes(uri).await,
            #[cfg(all(feature = "http", not(target_arch = "wasm32")))]
            Self::Http(r) => r.read_bytes(uri).await,
        }
    }
}
