//! Upload validation
//!
//! Checks run synchronously before a file enters the pipeline; a file that
//! fails never produces a network call.

use thiserror::Error;

use super::UploadFile;

/// Maximum file size (10MB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Accepted image MIME types
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Validation failure, reported per file
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Unsupported file type '{0}'. Supported: JPEG, PNG, WebP, GIF")]
    UnsupportedType(String),

    #[error("File too large ({size} bytes). Maximum size is {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("Empty file provided")]
    Empty,
}

/// Validate a candidate file against the type allow-list and size bound.
pub fn validate_file(file: &UploadFile) -> Result<(), ValidationError> {
    let mime = file.mime_type.to_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(ValidationError::UnsupportedType(file.mime_type.clone()));
    }

    if file.bytes.is_empty() {
        return Err(ValidationError::Empty);
    }

    let size = file.bytes.len() as u64;
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            size,
            max: MAX_FILE_SIZE,
        });
    }

    Ok(())
}
