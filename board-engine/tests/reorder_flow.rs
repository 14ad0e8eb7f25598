//! Reorder coordinator integration tests
//!
//! Virtual time (`start_paused`) makes the 250ms debounce deterministic.

mod common;

use std::sync::Arc;
use std::time::Duration;

use board_engine::{BoardCache, MemoryBoardCache, NoticeLevel, Notifier, ReorderCoordinator};
use common::{MockBoardApi, move_image, test_board};

fn create_coordinator(
    api: &Arc<MockBoardApi>,
    cache: &Arc<MemoryBoardCache>,
    notifier: Notifier,
) -> ReorderCoordinator {
    ReorderCoordinator::new(api.clone(), cache.clone(), notifier)
}

#[tokio::test(start_paused = true)]
async fn test_optimistic_write_is_visible_immediately() {
    let api = MockBoardApi::new();
    let cache = Arc::new(MemoryBoardCache::new());
    let coordinator = create_coordinator(&api, &cache, Notifier::new());

    let board = test_board("board-1", &["image-1", "image-2"]);
    cache.set("board-1", board.clone());

    let updated = move_image(&board, "image-2", 0);
    coordinator.queue_reorder("board-1", "image-2", 0, updated);

    // Before any timer fires, readers already see the new order.
    let cached = cache.get("board-1").unwrap();
    assert_eq!(cached.images[0].id, "image-2");
    assert_eq!(cached.images[1].id, "image-1");
    assert!(api.confirm_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_positions_renumbered_before_confirmation() {
    let api = MockBoardApi::new();
    let cache = Arc::new(MemoryBoardCache::new());
    let coordinator = create_coordinator(&api, &cache, Notifier::new());

    let board = test_board("board-1", &["a", "b", "c", "d"]);
    cache.set("board-1", board.clone());

    // move_image leaves stale position values behind
    let updated = move_image(&board, "d", 1);
    coordinator.queue_reorder("board-1", "d", 1, updated);

    let cached = cache.get("board-1").unwrap();
    assert!(cached.positions_valid());
    let positions: Vec<i64> = cached.images.iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4]);
}

#[tokio::test(start_paused = true)]
async fn test_single_intent_confirms_after_debounce() {
    let api = MockBoardApi::new();
    let cache = Arc::new(MemoryBoardCache::new());
    let coordinator = create_coordinator(&api, &cache, Notifier::new());

    let board = test_board("board-1", &["image-1", "image-2"]);
    cache.set("board-1", board.clone());

    coordinator.queue_reorder("board-1", "image-2", 0, move_image(&board, "image-2", 0));

    // Not yet: the window is 250ms.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(api.confirm_calls().is_empty());
    assert!(coordinator.is_saving("board-1"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let calls = api.confirm_calls();
    assert_eq!(calls.len(), 1);
    // Target index 0 becomes 1-based position 1.
    assert_eq!(
        calls[0],
        ("board-1".to_string(), "image-2".to_string(), 1)
    );
    assert!(!coordinator.is_saving("board-1"));

    // Success invalidates the entry so the next read refetches.
    assert!(cache.get("board-1").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_burst_coalesces_to_single_confirmation() {
    let api = MockBoardApi::new();
    let cache = Arc::new(MemoryBoardCache::new());
    let coordinator = create_coordinator(&api, &cache, Notifier::new());

    let board = test_board("board-1", &["image-1", "image-2", "image-3"]);
    cache.set("board-1", board.clone());

    // Three intents, each within 250ms of the previous one.
    let updated = move_image(&board, "image-3", 0);
    coordinator.queue_reorder("board-1", "image-3", 0, updated.clone());
    tokio::time::sleep(Duration::from_millis(100)).await;

    let updated = move_image(&updated, "image-1", 2);
    coordinator.queue_reorder("board-1", "image-1", 2, updated.clone());
    tokio::time::sleep(Duration::from_millis(100)).await;

    let updated = move_image(&updated, "image-2", 0);
    coordinator.queue_reorder("board-1", "image-2", 0, updated);

    tokio::time::sleep(Duration::from_millis(400)).await;

    // Exactly one network call, carrying the last intent's parameters.
    let calls = api.confirm_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        ("board-1".to_string(), "image-2".to_string(), 1)
    );
}

#[tokio::test(start_paused = true)]
async fn test_separate_windows_confirm_separately() {
    let api = MockBoardApi::new();
    let cache = Arc::new(MemoryBoardCache::new());
    let coordinator = create_coordinator(&api, &cache, Notifier::new());

    let board = test_board("board-1", &["a", "b", "c"]);
    cache.set("board-1", board.clone());

    let updated = move_image(&board, "c", 0);
    coordinator.queue_reorder("board-1", "c", 0, updated.clone());
    tokio::time::sleep(Duration::from_millis(300)).await;

    let updated = move_image(&updated, "a", 2);
    coordinator.queue_reorder("board-1", "a", 2, updated);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let calls = api.confirm_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, "c");
    assert_eq!(calls[0].2, 1);
    assert_eq!(calls[1].1, "a");
    assert_eq!(calls[1].2, 3);
}

#[tokio::test(start_paused = true)]
async fn test_failure_rolls_back_and_notifies() {
    let api = MockBoardApi::new();
    api.fail_reorder_with("Network error");
    let cache = Arc::new(MemoryBoardCache::new());
    let notifier = Notifier::new();
    let mut notices = notifier.subscribe();
    let coordinator = create_coordinator(&api, &cache, notifier);

    let board = test_board("board-1", &["image-1", "image-2"]);
    cache.set("board-1", board.clone());

    coordinator.queue_reorder("board-1", "image-2", 0, move_image(&board, "image-2", 0));

    // Optimistic order is visible while the call is pending.
    assert_eq!(cache.get("board-1").unwrap().images[0].id, "image-2");

    tokio::time::sleep(Duration::from_millis(300)).await;

    // The cache reverted to the snapshot captured before the intent.
    let cached = cache.get("board-1").unwrap();
    assert_eq!(cached, board);
    assert_eq!(cached.images[0].id, "image-1");
    assert!(!coordinator.is_saving("board-1"));

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("Network error"));
}

#[tokio::test(start_paused = true)]
async fn test_failure_with_empty_cache_invalidates() {
    let api = MockBoardApi::new();
    api.fail_reorder_with("stale state");
    let cache = Arc::new(MemoryBoardCache::new());
    let coordinator = create_coordinator(&api, &cache, Notifier::new());

    // No snapshot cached when the intent fires.
    let board = test_board("board-1", &["x", "y"]);
    coordinator.queue_reorder("board-1", "y", 0, move_image(&board, "y", 0));

    tokio::time::sleep(Duration::from_millis(300)).await;

    // Nothing to roll back to; the entry is dropped for a refetch.
    assert!(cache.get("board-1").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_boards_debounce_independently() {
    let api = MockBoardApi::new();
    let cache = Arc::new(MemoryBoardCache::new());
    let coordinator = create_coordinator(&api, &cache, Notifier::new());

    let board_a = test_board("board-a", &["a1", "a2"]);
    let board_b = test_board("board-b", &["b1", "b2"]);
    cache.set("board-a", board_a.clone());
    cache.set("board-b", board_b.clone());

    coordinator.queue_reorder("board-a", "a2", 0, move_image(&board_a, "a2", 0));
    tokio::time::sleep(Duration::from_millis(100)).await;
    coordinator.queue_reorder("board-b", "b2", 0, move_image(&board_b, "b2", 0));

    tokio::time::sleep(Duration::from_millis(400)).await;

    // One confirmation per board; board-a's timer was not reset by board-b.
    let calls = api.confirm_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "board-a");
    assert_eq!(calls[1].0, "board-b");
}

#[tokio::test(start_paused = true)]
async fn test_saving_flag_tracks_lifecycle() {
    let api = MockBoardApi::new();
    let cache = Arc::new(MemoryBoardCache::new());
    let coordinator = create_coordinator(&api, &cache, Notifier::new());

    assert!(!coordinator.is_saving("board-1"));

    let board = test_board("board-1", &["a", "b"]);
    cache.set("board-1", board.clone());
    coordinator.queue_reorder("board-1", "b", 0, move_image(&board, "b", 0));

    assert!(coordinator.is_saving("board-1"));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!coordinator.is_saving("board-1"));
}
