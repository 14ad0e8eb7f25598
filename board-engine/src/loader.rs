//! Cached board read path
//!
//! Readers go through the same cache the writer paths replace, so an
//! optimistic reorder is visible to every consumer immediately and an
//! invalidation makes the next read fetch server truth.

use std::sync::Arc;

use crate::cache::BoardCache;
use board_client::{BoardApi, ClientResult};
use shared::BoardSnapshot;

#[derive(Clone)]
pub struct BoardLoader {
    api: Arc<dyn BoardApi>,
    cache: Arc<dyn BoardCache>,
}

impl BoardLoader {
    pub fn new(api: Arc<dyn BoardApi>, cache: Arc<dyn BoardCache>) -> Self {
        Self { api, cache }
    }

    /// Return the cached snapshot, fetching and populating on a miss.
    pub async fn load(&self, board_id: &str) -> ClientResult<BoardSnapshot> {
        if let Some(snapshot) = self.cache.get(board_id) {
            return Ok(snapshot);
        }
        self.refresh(board_id).await
    }

    /// Fetch the authoritative snapshot and replace the cache entry.
    pub async fn refresh(&self, board_id: &str) -> ClientResult<BoardSnapshot> {
        let snapshot = self.api.fetch_board(board_id).await?;
        self.cache.set(board_id, snapshot.clone());
        tracing::debug!(
            board_id = %board_id,
            images = snapshot.images.len(),
            "Board refreshed"
        );
        Ok(snapshot)
    }
}
