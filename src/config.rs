//! Engine configuration
//!
//! All settings are plain serde structs with defaults, so a partial JSON
//! document only needs to name the values it overrides:
//!
//! ```rust,ignore
//! let config = EngineConfig::from_json_str(r#"{ "loader": { "target_size": 1.5 } }"#)?;
//! assert_eq!(config.loader.anisotropy, 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{PlacementError, Result};

/// 50 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Resource pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Largest bounding-box dimension of a normalized model, in world units.
    pub target_size: f32,
    /// Anisotropic filtering level applied to every material texture.
    pub anisotropy: u16,
    /// Upload size limit in bytes (inclusive).
    pub max_file_size: u64,
    /// Lower-case extensions, including the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            target_size: 2.0,
            anisotropy: 4,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: vec![".glb".to_string(), ".usdz".to_string()],
        }
    }
}

/// Heuristic detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Height of the virtual floor plane used without tracking.
    pub floor_height: f32,
    /// Hits farther than this from the ray origin are ignored.
    pub max_distance: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            floor_height: 0.0,
            max_distance: 20.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub loader: LoaderConfig,
    pub detector: DetectorConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let loader = &self.loader;
        if !(loader.target_size.is_finite() && loader.target_size > 0.0) {
            return Err(PlacementError::InvalidConfig(format!(
                "loader.target_size must be positive, got {}",
                loader.target_size
            )));
        }
        if loader.anisotropy == 0 {
            return Err(PlacementError::InvalidConfig(
                "loader.anisotropy must be at least 1".to_string(),
            ));
        }
        if let Some(ext) = loader.allowed_extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(PlacementError::InvalidConfig(format!(
                "allowed extension `{ext}` must start with a dot"
            )));
        }
        if !(self.detector.max_distance.is_finite() && self.detector.max_distance > 0.0) {
            return Err(PlacementError::InvalidConfig(format!(
                "detector.max_distance must be positive, got {}",
                self.detector.max_distance
            )));
        }
        if !self.detector.floor_height.is_finite() {
            return Err(PlacementError::InvalidConfig(
                "detector.floor_height must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
