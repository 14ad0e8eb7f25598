//! Board Client - HTTP client for the hosted board backend
//!
//! Provides network-based calls for board reads, reorder confirmation and
//! the two-phase image upload (store bytes, then register metadata).

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::{BoardApi, HttpBoardApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::{ApiResponse, BoardImage, BoardSnapshot, ImageDescriptor, StoredObject};
