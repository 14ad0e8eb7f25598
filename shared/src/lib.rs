//! Shared types for the Pinboard framework
//!
//! Common types used across multiple crates including board/image domain
//! types, upload descriptors, response structures, and utility types.

pub mod board;
pub mod response;
pub mod types;
pub mod upload;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use board::{BoardImage, BoardSnapshot};
pub use response::ApiResponse;
pub use types::Timestamp;
pub use upload::{ImageDescriptor, StoredObject, UploadStatus};
