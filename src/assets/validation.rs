use crate::assets::format::{ModelFormat, file_extension};
use crate::config::LoaderConfig;
use crate::errors::{PlacementError, Result};

/// Synchronous pre-load check for user-supplied model files.
///
/// Rejects files whose extension is not on the allow-list and files larger
/// than `max_file_size`. A file exactly at the limit is accepted.
pub fn validate_model_file(file_name: &str, size: u64, config: &LoaderConfig) -> Result<ModelFormat> {
    let ext = file_extension(file_name)
        .ok_or_else(|| PlacementError::UnsupportedExtension(file_name.to_string()))?;

    if !config
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
    {
        return Err(PlacementError::UnsupportedExtension(ext));
    }

    if size > config.max_file_size {
        return Err(PlacementError::FileTooLarge {
            size,
            max: config.max_file_size,
        });
    }

    ModelFormat::from_extension(&ext).ok_or(PlacementError::UnsupportedExtension(ext))
}
