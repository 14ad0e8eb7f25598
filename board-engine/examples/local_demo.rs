//! Local Demo - drive the sync engine against an in-process backend
//!
//! Shows the full pipeline without a network:
//! 1. Load a board through the cached read path
//! 2. Queue a burst of reorder intents (one debounced confirmation)
//! 3. Upload a small batch with the bounded scheduler
//!
//! Run: cargo run -p board-engine --example local_demo

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use board_client::{BoardApi, ClientError, ClientResult};
use board_engine::{BoardSyncEngine, MemoryBoardCache, UploadFile};
use shared::{BoardImage, BoardSnapshot, ImageDescriptor, StoredObject};

/// In-process backend: boards live in a map, uploads take a moment.
struct LocalBackend {
    boards: Mutex<HashMap<String, BoardSnapshot>>,
}

impl LocalBackend {
    fn new() -> Arc<Self> {
        let mut board = BoardSnapshot::new("demo-board", "Demo board");
        board.images = (1..=3)
            .map(|n| BoardImage {
                id: format!("image-{}", n),
                board_id: "demo-board".to_string(),
                position: n,
                storage_path: format!("demo-board/image-{}.png", n),
                mime_type: "image/png".to_string(),
                size_bytes: 1024,
                original_filename: format!("image-{}.png", n),
                created_at: shared::util::now_millis(),
            })
            .collect();

        let mut boards = HashMap::new();
        boards.insert(board.board_id.clone(), board);
        Arc::new(Self {
            boards: Mutex::new(boards),
        })
    }
}

#[async_trait]
impl BoardApi for LocalBackend {
    async fn fetch_board(&self, board_id: &str) -> ClientResult<BoardSnapshot> {
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
        println!(
            "   backend: confirmed {} -> position {} on {}",
            image_id, new_position, board_id
        );
        Ok(())
    }

    async fn store_bytes(
        &self,
        board_id: &str,
        filename: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<StoredObject> {
        tokio::time::sleep(Duration::from_millis(50)).await;
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
        Ok(BoardImage {
            id: uuid::Uuid::new_v4().to_string(),
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("=== Board Engine Local Demo ===\n");

    let backend = LocalBackend::new();
    let cache = Arc::new(MemoryBoardCache::new());
    let engine = BoardSyncEngine::new(backend.clone(), cache.clone());

    let mut notices = engine.notifier.subscribe();

    // === 1. Cached read path ===
    println!("1. Loading board...");
    let board = engine.loader.load("demo-board").await?;
    println!(
        "   {} images: {:?}\n",
        board.images.len(),
        board
            .images
            .iter()
            .map(|i| i.id.as_str())
            .collect::<Vec<_>>()
    );

    // === 2. Debounced reorder ===
    println!("2. Moving image-3 to the front (two quick intents)...");
    let mut updated = board.clone();
    let image = updated.images.remove(2);
    updated.images.insert(0, image);
    engine
        .reorder
        .queue_reorder("demo-board", "image-3", 0, updated.clone());

    // Second thoughts before the debounce window closes: back to index 1.
    let image = updated.images.remove(0);
    updated.images.insert(1, image);
    engine
        .reorder
        .queue_reorder("demo-board", "image-3", 1, updated);

    tokio::time::sleep(Duration::from_millis(400)).await;
    println!("   saving = {}\n", engine.reorder.is_saving("demo-board"));

    // === 3. Bounded uploads ===
    println!("3. Uploading two files (and one the validator rejects)...");
    let ids = engine.uploads.upload_images(
        "demo-board",
        vec![
            UploadFile {
                filename: "sunset.png".to_string(),
                mime_type: "image/png".to_string(),
                bytes: vec![0u8; 2048],
            },
            UploadFile {
                filename: "harbor.jpg".to_string(),
                mime_type: "image/jpeg".to_string(),
                bytes: vec![0u8; 4096],
            },
            UploadFile {
                filename: "notes.txt".to_string(),
                mime_type: "text/plain".to_string(),
                bytes: vec![0u8; 64],
            },
        ],
    );

    tokio::time::sleep(Duration::from_millis(300)).await;
    for id in &ids {
        if let Some(task) = engine.uploads.task(id) {
            println!(
                "   {} -> {} ({}%){}",
                task.filename,
                task.status,
                task.progress,
                task.error
                    .as_deref()
                    .map(|e| format!(" [{}]", e))
                    .unwrap_or_default()
            );
        }
    }

    println!("\n4. Notices:");
    while let Ok(notice) = notices.try_recv() {
        println!("   [{:?}] {}", notice.level, notice.message);
    }

    Ok(())
}
