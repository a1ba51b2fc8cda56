//! Model resource pipeline
//!
//! Loading flow: [`ResourceCache::load`] picks an [`AssetReaderVariant`] for
//! the URL, reads the bytes, hands them to a [`ModelDecoder`], and runs
//! [`post_process`] on the result. Any failure along the way yields the
//! placeholder from [`fallback_graph`] instead, reported through a
//! [`Diagnostic`].

pub mod cache;
pub mod decoder;
pub mod fallback;
pub mod format;
pub mod io;
pub mod metrics;
pub mod post_process;
pub mod resource;
pub mod validation;

pub use cache::{Diagnostic, LoadFuture, ResourceCache, UploadTicket};
pub use decoder::{DecodedModel, GltfDecoder, ModelDecoder};
pub use fallback::fallback_graph;
pub use format::{ModelFormat, file_extension};
pub use io::{AssetReader, AssetReaderVariant, BlobStore, MemoryAssetReader};
pub use metrics::ModelMetrics;
pub use post_process::{normalize, post_process};
pub use resource::{AnimationClip, DecodeOutcome, FallbackKind, ModelInstance, ModelResource};
pub use validation::validate_model_file;
