//! Error Types
//!
//! This module defines the error types used throughout the placement core.
//!
//! # Overview
//!
//! The main error type [`PlacementError`] covers all failure modes including:
//! - Upload validation failures (extension, size)
//! - Asset reading and decoding errors
//! - Tracking session acquisition errors
//! - Configuration errors
//!
//! Most of these never reach the UI layer directly. The resource cache turns
//! asset errors into fallback models plus a diagnostic, and the detector turns
//! missing hit-test resources into an empty frame. Only validation and session
//! acquisition are surfaced to callers.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, PlacementError>`.
//!
//! ```rust,ignore
//! use myth_placement::errors::{PlacementError, Result};
//!
//! fn check_upload(name: &str, size: u64) -> Result<()> {
//!     myth_placement::assets::validate_model_file(name, size, &Default::default())?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the placement core.
#[derive(Error, Debug)]
pub enum PlacementError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// The file extension is not on the allow-list.
    #[error("Unsupported model file extension: {0}")]
    UnsupportedExtension(String),

    /// The file exceeds the configured size limit.
    #[error("Model file too large: {size} bytes (limit: {max} bytes)")]
    FileTooLarge {
        /// Size of the rejected file
        size: u64,
        /// Configured maximum
        max: u64,
    },

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The decoder produced a graph without any renderable geometry.
    #[error("Model contains no renderable geometry: {0}")]
    EmptyModel(String),

    /// Generic decode failure reported by a decoder implementation.
    #[error("Model decode error: {0}")]
    DecodeError(String),

    /// glTF parsing or loading error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    GltfError(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // HTTP & Network Errors
    // ========================================================================
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status}")]
    HttpResponseError {
        /// HTTP status code
        status: u16,
    },

    // ========================================================================
    // Tracking Session Errors
    // ========================================================================
    /// The platform does not support spatial tracking sessions.
    #[error("Spatial tracking is not supported on this platform")]
    TrackingUnsupported,

    /// The user or platform denied the tracking permission.
    #[error("Spatial tracking permission denied")]
    PermissionDenied,

    /// Tracking requires a secure context (e.g. HTTPS).
    #[error("Spatial tracking requires a secure context")]
    InsecureContext,

    /// The platform failed to start a tracking session.
    #[error("Failed to start tracking session: {0}")]
    SessionStartFailed(String),

    /// The reference frame could not be acquired.
    #[error("Failed to acquire reference frame: {0}")]
    ReferenceFrameUnavailable(String),

    /// The hit-test source could not be created.
    #[error("Failed to create hit-test source: {0}")]
    HitTestSourceUnavailable(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Async & Platform Errors
    // ========================================================================
    /// Task join error (when a blocking decode task fails to complete).
    #[error("Task join error: {0}")]
    TaskJoinError(String),

    /// Feature not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

impl PlacementError {
    /// Returns `true` for errors that mean "tracking is not available here"
    /// rather than a transient failure. The engine stays usable in heuristic
    /// mode for these.
    #[must_use]
    pub fn is_capability_error(&self) -> bool {
        matches!(
            self,
            Self::TrackingUnsupported | Self::PermissionDenied | Self::InsecureContext
        )
    }
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

#[cfg(feature = "gltf")]
impl From<gltf::Error> for PlacementError {
    fn from(err: gltf::Error) -> Self {
        PlacementError::GltfError(err.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<tokio::task::JoinError> for PlacementError {
    fn from(err: tokio::task::JoinError) -> Self {
        PlacementError::TaskJoinError(err.to_string())
    }
}

/// Alias for `Result<T, PlacementError>`.
pub type Result<T> = std::result::Result<T, PlacementError>;
