//! Upload scheduler
//!
//! Accepts a batch of candidate files for a board, validates each, and
//! drives at most [`MAX_CONCURRENT_UPLOADS`] two-phase uploads (store bytes,
//! then register metadata) at a time. Per-task state is observable through
//! [`UploadTask`] snapshots and every task can be cancelled individually
//! without disturbing its siblings.

pub mod validate;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::cache::BoardCache;
use crate::notify::Notifier;
use board_client::BoardApi;
use shared::{ImageDescriptor, UploadStatus};

pub use validate::{ALLOWED_MIME_TYPES, MAX_FILE_SIZE, ValidationError};

/// Concurrency ceiling for active uploads
pub const MAX_CONCURRENT_UPLOADS: usize = 4;

/// A candidate file handed to the scheduler.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Observable state of one upload.
///
/// Snapshots of this struct are handed out to callers; the authoritative
/// copy is mutated only by the scheduler itself, so state transitions stay
/// centralized.
#[derive(Debug, Clone, Serialize)]
pub struct UploadTask {
    pub id: String,
    pub board_id: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub status: UploadStatus,
    /// 0–100; coarse milestones during the store phase
    pub progress: u8,
    /// Set only in the `Error` state
    pub error: Option<String>,
    #[serde(skip)]
    seq: u64,
}

/// Bounded-concurrency scheduler for two-phase image uploads.
///
/// Cheap to clone; all state lives behind `Arc`.
#[derive(Clone)]
pub struct UploadScheduler {
    api: Arc<dyn BoardApi>,
    cache: Arc<dyn BoardCache>,
    notifier: Notifier,
    tasks: Arc<DashMap<String, UploadTask>>,
    tokens: Arc<DashMap<String, CancellationToken>>,
    slots: Arc<Semaphore>,
    seq: Arc<AtomicU64>,
}

impl UploadScheduler {
    pub fn new(api: Arc<dyn BoardApi>, cache: Arc<dyn BoardCache>, notifier: Notifier) -> Self {
        Self::with_concurrency(api, cache, notifier, MAX_CONCURRENT_UPLOADS)
    }

    /// Create a scheduler with a custom concurrency ceiling.
    pub fn with_concurrency(
        api: Arc<dyn BoardApi>,
        cache: Arc<dyn BoardCache>,
        notifier: Notifier,
        max_concurrent: usize,
    ) -> Self {
        Self {
            api,
            cache,
            notifier,
            tasks: Arc::new(DashMap::new()),
            tokens: Arc::new(DashMap::new()),
            slots: Arc::new(Semaphore::new(max_concurrent)),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Enqueue a batch of files for a board. Returns the task ids in input
    /// order.
    ///
    /// Files failing validation become terminal `Error` tasks immediately
    /// and never reach the network. Valid files start `Pending` and are
    /// admitted in enqueue order as slots free up.
    pub fn upload_images(&self, board_id: &str, files: Vec<UploadFile>) -> Vec<String> {
        let mut ids = Vec::with_capacity(files.len());

        for file in files {
            let id = uuid::Uuid::new_v4().to_string();
            let mut task = UploadTask {
                id: id.clone(),
                board_id: board_id.to_string(),
                filename: file.filename.clone(),
                mime_type: file.mime_type.clone(),
                size_bytes: file.bytes.len() as u64,
                status: UploadStatus::Pending,
                progress: 0,
                error: None,
                seq: self.seq.fetch_add(1, Ordering::Relaxed),
            };

            if let Err(e) = validate::validate_file(&file) {
                let message = e.to_string();
                task.status = UploadStatus::Error;
                task.error = Some(message.clone());
                tracing::warn!(filename = %file.filename, "Upload rejected: {message}");
                self.tasks.insert(id.clone(), task);
                self.notifier.error(message);
                ids.push(id);
                continue;
            }

            let token = CancellationToken::new();
            self.tasks.insert(id.clone(), task);
            self.tokens.insert(id.clone(), token.clone());

            let scheduler = self.clone();
            let board = board_id.to_string();
            let task_id = id.clone();
            tokio::spawn(async move {
                scheduler.run_task(board, task_id, file, token).await;
            });

            ids.push(id);
        }

        ids
    }

    /// Cancel one upload.
    ///
    /// A `Pending` task is removed outright. An active task gets its token
    /// cancelled: the in-flight request future is dropped (best-effort
    /// abort; already-stored bytes may be orphaned) and the task ends up
    /// `Cancelled`. Terminal tasks are untouched. Sibling tasks never
    /// notice.
    pub fn cancel_upload(&self, task_id: &str) {
        let removed = self
            .tasks
            .remove_if(task_id, |_, task| task.status == UploadStatus::Pending)
            .is_some();

        if removed {
            tracing::debug!(task_id = %task_id, "Pending upload removed");
            if let Some((_, token)) = self.tokens.remove(task_id) {
                token.cancel();
            }
            return;
        }

        let active = self
            .tasks
            .get(task_id)
            .map(|t| !t.status.is_terminal())
            .unwrap_or(false);
        if active {
            if let Some(token) = self.tokens.get(task_id) {
                token.cancel();
            }
        }
    }

    /// Snapshot of one task.
    pub fn task(&self, task_id: &str) -> Option<UploadTask> {
        self.tasks.get(task_id).map(|t| t.value().clone())
    }

    /// Snapshots of all tracked tasks, in enqueue order.
    pub fn tasks(&self) -> Vec<UploadTask> {
        let mut all: Vec<UploadTask> = self.tasks.iter().map(|t| t.value().clone()).collect();
        all.sort_by_key(|t| t.seq);
        all
    }

    /// Number of tasks currently executing (store or register phase).
    pub fn active_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| {
                matches!(
                    t.status,
                    UploadStatus::Uploading | UploadStatus::Processing
                )
            })
            .count()
    }

    /// Drop all terminal tasks from tracking.
    pub fn clear_finished(&self) {
        self.tasks.retain(|_, task| !task.status.is_terminal());
    }

    /// Drive one admitted file through both phases.
    async fn run_task(
        self,
        board_id: String,
        task_id: String,
        file: UploadFile,
        token: CancellationToken,
    ) {
        let UploadFile {
            filename,
            mime_type,
            bytes,
        } = file;

        // Wait for a slot. A cancel that lands here never consumed a slot,
        // and cancel_upload has already removed the task entry.
        let _permit = tokio::select! {
            _ = token.cancelled() => {
                self.tasks
                    .remove_if(&task_id, |_, t| t.status == UploadStatus::Pending);
                self.tokens.remove(&task_id);
                return;
            }
            permit = self.slots.clone().acquire_owned() => {
                match permit {
                    Ok(p) => p,
                    Err(_) => return, // scheduler dropped
                }
            }
        };

        self.update_task(&task_id, |t| {
            t.status = UploadStatus::Uploading;
            t.progress = 10;
        });
        tracing::debug!(task_id = %task_id, filename = %filename, "Upload admitted");

        // Phase 1: store bytes under a fresh path scoped to the board.
        let stored = tokio::select! {
            _ = token.cancelled() => {
                self.finish_cancelled(&task_id);
                return;
            }
            result = self.api.store_bytes(&board_id, &filename, &mime_type, bytes) => {
                match result {
                    Ok(stored) => stored,
                    Err(e) => {
                        self.fail_task(&task_id, &filename, e.to_string());
                        return;
                    }
                }
            }
        };

        self.update_task(&task_id, |t| {
            t.status = UploadStatus::Processing;
            t.progress = 90;
        });

        // Phase 2: register metadata; the server assigns the position.
        let descriptor = ImageDescriptor::from(stored);
        let image = tokio::select! {
            _ = token.cancelled() => {
                self.finish_cancelled(&task_id);
                return;
            }
            result = self.api.register_image(&board_id, &descriptor) => {
                match result {
                    Ok(image) => image,
                    Err(e) => {
                        self.fail_task(&task_id, &filename, e.to_string());
                        return;
                    }
                }
            }
        };

        self.update_task(&task_id, |t| {
            t.status = UploadStatus::Success;
            t.progress = 100;
        });
        self.tokens.remove(&task_id);

        // The new image must become visible to readers of the board cache.
        self.cache.invalidate(&board_id);
        self.notifier.success(format!("{} uploaded", filename));
        tracing::info!(
            task_id = %task_id,
            image_id = %image.id,
            filename = %filename,
            "Upload complete"
        );
    }

    /// The single mutation point for task state.
    fn update_task(&self, task_id: &str, apply: impl FnOnce(&mut UploadTask)) {
        if let Some(mut task) = self.tasks.get_mut(task_id) {
            apply(&mut task);
        }
    }

    fn fail_task(&self, task_id: &str, filename: &str, raw: String) {
        let message = map_backend_error(&raw);
        self.update_task(task_id, |t| {
            t.status = UploadStatus::Error;
            t.error = Some(message.clone());
        });
        self.tokens.remove(task_id);
        tracing::warn!(task_id = %task_id, filename = %filename, "Upload failed: {message}");
        self.notifier.error(message);
    }

    fn finish_cancelled(&self, task_id: &str) {
        self.update_task(task_id, |t| {
            t.status = UploadStatus::Cancelled;
        });
        self.tokens.remove(task_id);
        tracing::debug!(task_id = %task_id, "Upload cancelled");
    }
}

/// Map raw backend failure text to the message shown to the user.
///
/// Permission-shaped backend messages get a specific sentence; everything
/// else passes through unchanged.
fn map_backend_error(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("permission denied")
        || lower.contains("row-level security")
        || lower.contains("not authorized")
    {
        "You don't have permission to add images to this board".to_string()
    } else {
        raw.to_string()
    }
}
