//! Upload wire types
//!
//! Types exchanged with the hosted backend during the two-phase upload:
//! store the raw bytes first, then register the image metadata.

use serde::{Deserialize, Serialize};

/// Result of the store phase: where the bytes landed and what they were.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Object path in blob storage, scoped to the board
    pub path: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub original_filename: String,
}

/// Payload of the register phase. The server assigns the final position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub original_filename: String,
}

impl From<StoredObject> for ImageDescriptor {
    fn from(stored: StoredObject) -> Self {
        Self {
            storage_path: stored.path,
            mime_type: stored.mime_type,
            size_bytes: stored.size_bytes,
            original_filename: stored.original_filename,
        }
    }
}

/// Lifecycle state of one upload task.
///
/// `Success`, `Error` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Queued, waiting for an execution slot
    Pending,
    /// Store phase in progress
    Uploading,
    /// Bytes stored, registration in progress
    Processing,
    Success,
    Error,
    Cancelled,
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Cancelled)
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}
