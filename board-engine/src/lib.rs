//! Board Engine - client-side sync core for boards
//!
//! Owns the optimistic mutation pipeline between the UI and the hosted
//! backend:
//!
//! - [`cache`]: process-wide snapshot cache keyed by board identity
//! - [`reorder`]: debounced, optimistic image reordering with rollback
//! - [`upload`]: bounded-concurrency two-phase upload scheduler
//! - [`loader`]: cached board read path
//! - [`notify`]: user-facing notice channel (rendering is external)

pub mod cache;
pub mod engine;
pub mod loader;
pub mod notify;
pub mod reorder;
pub mod upload;

pub use cache::{BoardCache, CacheEvent, MemoryBoardCache};
pub use engine::{BoardSyncEngine, EngineConfig};
pub use loader::BoardLoader;
pub use notify::{NoticeLevel, Notifier, UserNotice};
pub use reorder::ReorderCoordinator;
pub use upload::{UploadFile, UploadScheduler, UploadTask};

// Re-export the backend seam so consumers need only this crate
pub use board_client::BoardApi;
pub use shared::{BoardImage, BoardSnapshot, UploadStatus};
