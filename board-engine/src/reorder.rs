//! Reorder coordinator
//!
//! Turns a burst of "move image X to index Y" intents into one debounced
//! backend confirmation per settling period:
//!
//! 1. The cache is replaced synchronously on every intent (optimistic write)
//! 2. Only the latest intent per board survives the debounce window
//! 3. A rejected confirmation restores the snapshot captured by the
//!    triggering intent and surfaces the failure as a user notice
//!
//! Per board the lifecycle is `Idle → PendingDebounce → Confirming → Idle`,
//! where `PendingDebounce` self-loops on new intents (timer reset).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::cache::BoardCache;
use crate::notify::Notifier;
use board_client::BoardApi;
use shared::BoardSnapshot;

/// Quiescence window before a queued intent is confirmed with the backend.
pub const DEBOUNCE_MS: u64 = 250;

/// Latest pending variables for one board. A newer intent overwrites this
/// slot; there is never a queue of pending confirmations.
struct PendingReorder {
    image_id: String,
    /// 1-based target position (target index + 1)
    new_position: i64,
    /// Snapshot to restore if the confirmation is rejected. `None` when the
    /// cache held nothing when the intent fired.
    rollback: Option<BoardSnapshot>,
}

#[derive(Default)]
struct BoardReorderState {
    pending: Option<PendingReorder>,
    timer: Option<JoinHandle<()>>,
    /// Bumped by every intent; a timer dispatches only while its generation
    /// is still current
    generation: u64,
    saving: bool,
}

/// Debounce/optimistic-update/rollback lifecycle for board image reordering.
///
/// Cheap to clone; all state lives behind `Arc`.
#[derive(Clone)]
pub struct ReorderCoordinator {
    api: Arc<dyn BoardApi>,
    cache: Arc<dyn BoardCache>,
    notifier: Notifier,
    debounce: Duration,
    boards: Arc<DashMap<String, BoardReorderState>>,
}

impl ReorderCoordinator {
    pub fn new(api: Arc<dyn BoardApi>, cache: Arc<dyn BoardCache>, notifier: Notifier) -> Self {
        Self {
            api,
            cache,
            notifier,
            debounce: Duration::from_millis(DEBOUNCE_MS),
            boards: Arc::new(DashMap::new()),
        }
    }

    /// Override the debounce window (tests shorten it).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Queue a reorder intent: `image_id` moves to `target_index` (0-based)
    /// and `updated` is the caller-computed full new ordering.
    ///
    /// The cache reflects `updated` synchronously when this returns. The
    /// backend call fires only after the debounce window passes with no
    /// newer intent for the same board.
    ///
    /// Callers should not invoke this when the image already sits at
    /// `target_index`; no-op suppression happens at the intent source.
    pub fn queue_reorder(
        &self,
        board_id: &str,
        image_id: &str,
        target_index: usize,
        mut updated: BoardSnapshot,
    ) {
        // Rollback snapshot for this intent. `BoardSnapshot` owns its image
        // vector, so the clone is an independent deep copy.
        let rollback = self.cache.get(board_id);

        // Restore the position invariant (1..=N) before anything is cached
        // or confirmed.
        updated.renumber();
        self.cache.set(board_id, updated);

        let generation = {
            let mut state = self.boards.entry(board_id.to_string()).or_default();
            state.generation += 1;
            state.saving = true;
            state.pending = Some(PendingReorder {
                image_id: image_id.to_string(),
                new_position: target_index as i64 + 1,
                rollback,
            });
            // Cancel-and-replace: one timer per board, reset on every intent.
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.generation
        };

        tracing::debug!(
            board_id = %board_id,
            image_id = %image_id,
            target_index,
            "Reorder queued"
        );

        let coordinator = self.clone();
        let board = board_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(coordinator.debounce).await;
            coordinator.dispatch(&board, generation).await;
        });

        if let Some(mut state) = self.boards.get_mut(board_id) {
            if state.generation == generation {
                state.timer = Some(handle);
            } else {
                // A newer intent slipped in while we spawned; ours is stale.
                handle.abort();
            }
        }
    }

    /// Whether a board has an unconfirmed reorder (pending or in flight).
    pub fn is_saving(&self, board_id: &str) -> bool {
        self.boards.get(board_id).map(|s| s.saving).unwrap_or(false)
    }

    /// Debounce expiry: send the latest pending variables to the backend.
    async fn dispatch(&self, board_id: &str, generation: u64) {
        let pending = {
            let Some(mut state) = self.boards.get_mut(board_id) else {
                return;
            };
            if state.generation != generation {
                // Superseded while we slept.
                return;
            }
            state.timer = None;
            state.pending.take()
        };
        let Some(pending) = pending else { return };

        let result = self
            .api
            .confirm_reorder(board_id, &pending.image_id, pending.new_position)
            .await;

        match result {
            Ok(()) => {
                // Reconcile future reads with the authoritative server order.
                self.cache.invalidate(board_id);
                tracing::debug!(
                    board_id = %board_id,
                    image_id = %pending.image_id,
                    position = pending.new_position,
                    "Reorder saved"
                );
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(
                    board_id = %board_id,
                    image_id = %pending.image_id,
                    "Reorder rejected, rolling back: {message}"
                );
                match pending.rollback {
                    Some(snapshot) => self.cache.set(board_id, snapshot),
                    None => self.cache.invalidate(board_id),
                }
                self.notifier.error(message);
            }
        }

        if let Some(mut state) = self.boards.get_mut(board_id) {
            if state.generation == generation {
                state.saving = false;
            }
        }
    }
}
