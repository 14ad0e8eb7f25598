//! Board snapshot cache
//!
//! One mutable entry per board identity, shared by every reader and by the
//! coordinated writer paths (optimistic reorder write, reorder rollback,
//! refresh after confirmation, upload refresh). Writers always replace the
//! whole entry; partial patches would let readers observe interleaved
//! states.

use std::collections::HashMap;
use std::sync::Mutex;

use shared::BoardSnapshot;
use tokio::sync::broadcast;

/// Cache change notifications, for readers that want to refetch.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A snapshot was replaced wholesale
    Replaced { board_id: String },
    /// An entry was dropped; the next read should refetch
    Invalidated { board_id: String },
}

/// Key-value cache over board snapshots.
///
/// Injected as `Arc<dyn BoardCache>` so components and tests can substitute
/// their own implementation.
pub trait BoardCache: Send + Sync {
    /// Current cached snapshot, if any. Returns an owned copy.
    fn get(&self, board_id: &str) -> Option<BoardSnapshot>;

    /// Replace the cached snapshot for a board (full-key replace).
    fn set(&self, board_id: &str, snapshot: BoardSnapshot);

    /// Drop the entry; future reads refetch from the backend.
    fn invalidate(&self, board_id: &str);
}

/// In-memory [`BoardCache`] with a broadcast channel of [`CacheEvent`]s.
pub struct MemoryBoardCache {
    entries: Mutex<HashMap<String, BoardSnapshot>>,
    events: broadcast::Sender<CacheEvent>,
}

impl MemoryBoardCache {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// `capacity` is the event channel capacity, not an entry bound.
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            entries: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Subscribe to cache change events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: CacheEvent) {
        // Send fails only when nobody subscribes, which is fine.
        let _ = self.events.send(event);
    }
}

impl Default for MemoryBoardCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardCache for MemoryBoardCache {
    fn get(&self, board_id: &str) -> Option<BoardSnapshot> {
        self.entries.lock().unwrap().get(board_id).cloned()
    }

    fn set(&self, board_id: &str, snapshot: BoardSnapshot) {
        self.entries
            .lock()
            .unwrap()
            .insert(board_id.to_string(), snapshot);
        self.emit(CacheEvent::Replaced {
            board_id: board_id.to_string(),
        });
    }

    fn invalidate(&self, board_id: &str) {
        let removed = self.entries.lock().unwrap().remove(board_id).is_some();
        if removed {
            tracing::debug!(board_id = %board_id, "Cache entry invalidated");
        }
        self.emit(CacheEvent::Invalidated {
            board_id: board_id.to_string(),
        });
    }
}
