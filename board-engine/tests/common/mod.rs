//! Shared test doubles and builders
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use board_client::{BoardApi, ClientError, ClientResult};
use shared::{BoardImage, BoardSnapshot, ImageDescriptor, StoredObject};
use tokio::sync::Semaphore;

/// Backend double with controllable failures and timing.
///
/// With `gated()`, `store_bytes` parks until the test releases a permit, so
/// tests can observe exactly how many stores are outstanding at once.
pub struct MockBoardApi {
    gate: Option<Arc<Semaphore>>,
    store_started: AtomicUsize,
    store_active: AtomicUsize,
    store_peak: AtomicUsize,
    fail_store: Mutex<HashMap<String, String>>,
    fail_reorder: Mutex<Option<String>>,
    confirm_calls: Mutex<Vec<(String, String, i64)>>,
    register_calls: Mutex<Vec<ImageDescriptor>>,
    register_seq: AtomicUsize,
    boards: Mutex<HashMap<String, BoardSnapshot>>,
    fetch_calls: AtomicUsize,
}

impl MockBoardApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// Store phase blocks until `release_store` grants a permit.
    pub fn gated() -> Arc<Self> {
        Arc::new(Self::build(Some(Arc::new(Semaphore::new(0)))))
    }

    fn build(gate: Option<Arc<Semaphore>>) -> Self {
        Self {
            gate,
            store_started: AtomicUsize::new(0),
            store_active: AtomicUsize::new(0),
            store_peak: AtomicUsize::new(0),
            fail_store: Mutex::new(HashMap::new()),
            fail_reorder: Mutex::new(None),
            confirm_calls: Mutex::new(Vec::new()),
            register_calls: Mutex::new(Vec::new()),
            register_seq: AtomicUsize::new(0),
            boards: Mutex::new(HashMap::new()),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Allow `n` parked store calls to proceed.
    pub fn release_store(&self, n: usize) {
        self.gate
            .as_ref()
            .expect("release_store requires a gated mock")
            .add_permits(n);
    }

    pub fn fail_store_for(&self, filename: &str, message: &str) {
        self.fail_store
            .lock()
            .unwrap()
            .insert(filename.to_string(), message.to_string());
    }

    pub fn fail_reorder_with(&self, message: &str) {
        *self.fail_reorder.lock().unwrap() = Some(message.to_string());
    }

    pub fn put_board(&self, snapshot: BoardSnapshot) {
        self.boards
            .lock()
            .unwrap()
            .insert(snapshot.board_id.clone(), snapshot);
    }

    pub fn confirm_calls(&self) -> Vec<(String, String, i64)> {
        self.confirm_calls.lock().unwrap().clone()
    }

    pub fn register_count(&self) -> usize {
        self.register_calls.lock().unwrap().len()
    }

    pub fn store_started(&self) -> usize {
        self.store_started.load(Ordering::SeqCst)
    }

    pub fn store_peak(&self) -> usize {
        self.store_peak.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

/// Decrements the active-store counter even when the call future is
/// dropped mid-flight (cancellation).
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BoardApi for MockBoardApi {
    async fn fetch_board(&self, board_id: &str) -> ClientResult<BoardSnapshot> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.boards
            .lock()
            .unwrap()
            .get(board_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(board_id.to_string()))
    }

    async fn confirm_reorder(
        &self,
        board_id: &str,
        image_id: &str,
        new_position: i64,
    ) -> ClientResult<()> {
        self.confirm_calls.lock().unwrap().push((
            board_id.to_string(),
            image_id.to_string(),
            new_position,
        ));
        if let Some(message) = self.fail_reorder.lock().unwrap().clone() {
            return Err(ClientError::Internal(message));
        }
        Ok(())
    }

    async fn store_bytes(
        &self,
        board_id: &str,
        filename: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<StoredObject> {
        self.store_started.fetch_add(1, Ordering::SeqCst);
        let active = self.store_active.fetch_add(1, Ordering::SeqCst) + 1;
        self.store_peak.fetch_max(active, Ordering::SeqCst);
        let _guard = ActiveGuard(&self.store_active);

        let failure = self.fail_store.lock().unwrap().get(filename).cloned();
        if let Some(message) = failure {
            return Err(ClientError::Storage(message));
        }

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("store gate closed").forget();
        }

        Ok(StoredObject {
            path: format!("{}/{}", board_id, filename),
            mime_type: mime_type.to_string(),
            size_bytes: bytes.len() as u64,
            original_filename: filename.to_string(),
        })
    }

    async fn register_image(
        &self,
        board_id: &str,
        descriptor: &ImageDescriptor,
    ) -> ClientResult<BoardImage> {
        self.register_calls.lock().unwrap().push(descriptor.clone());
        let n = self.register_seq.fetch_add(1, Ordering::SeqCst);
        Ok(BoardImage {
            id: format!("img-{}", n),
            board_id: board_id.to_string(),
            position: 1,
            storage_path: descriptor.storage_path.clone(),
            mime_type: descriptor.mime_type.clone(),
            size_bytes: descriptor.size_bytes,
            original_filename: descriptor.original_filename.clone(),
            created_at: shared::util::now_millis(),
        })
    }
}

/// Board with the given image ids, positions 1..=N.
pub fn test_board(board_id: &str, image_ids: &[&str]) -> BoardSnapshot {
    let mut snapshot = BoardSnapshot::new(board_id, "Test board");
    snapshot.images = image_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| BoardImage {
            id: id.to_string(),
            board_id: board_id.to_string(),
            position: idx as i64 + 1,
            storage_path: format!("{}/{}.png", board_id, id),
            mime_type: "image/png".to_string(),
            size_bytes: 1024,
            original_filename: format!("{}.png", id),
            created_at: 1_700_000_000_000,
        })
        .collect();
    snapshot
}

/// Caller-computed new ordering: move `image_id` to `target_index`.
///
/// Positions are left stale on purpose; restoring the 1..=N invariant is
/// the coordinator's job.
pub fn move_image(snapshot: &BoardSnapshot, image_id: &str, target_index: usize) -> BoardSnapshot {
    let mut updated = snapshot.clone();
    let from = updated
        .image_index(image_id)
        .expect("image not on the board");
    let image = updated.images.remove(from);
    updated.images.insert(target_index, image);
    updated
}

pub fn test_file(filename: &str, mime_type: &str, size: usize) -> board_engine::UploadFile {
    board_engine::UploadFile {
        filename: filename.to_string(),
        mime_type: mime_type.to_string(),
        bytes: vec![0u8; size],
    }
}

/// Poll `cond` until it holds, panicking after 2 seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 2s");
}
