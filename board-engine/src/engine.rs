//! Engine facade
//!
//! Wires the cache, reorder coordinator, upload scheduler and loader over
//! one backend, sharing a single notice channel. Embedding applications
//! construct one of these per authenticated session.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::BoardCache;
use crate::loader::BoardLoader;
use crate::notify::Notifier;
use crate::reorder::{DEBOUNCE_MS, ReorderCoordinator};
use crate::upload::{MAX_CONCURRENT_UPLOADS, UploadScheduler};
use board_client::BoardApi;

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Reorder debounce window in milliseconds (default: 250)
    pub debounce_ms: u64,
    /// Upload concurrency ceiling (default: 4)
    pub max_concurrent_uploads: usize,
    /// Capacity of the notice broadcast channel (default: 256)
    pub notice_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            max_concurrent_uploads: MAX_CONCURRENT_UPLOADS,
            notice_capacity: 256,
        }
    }
}

/// The assembled sync core.
#[derive(Clone)]
pub struct BoardSyncEngine {
    pub reorder: ReorderCoordinator,
    pub uploads: UploadScheduler,
    pub loader: BoardLoader,
    pub notifier: Notifier,
}

impl BoardSyncEngine {
    /// Create an engine with default configuration.
    pub fn new(api: Arc<dyn BoardApi>, cache: Arc<dyn BoardCache>) -> Self {
        Self::from_config(api, cache, EngineConfig::default())
    }

    /// Create an engine from explicit configuration.
    pub fn from_config(
        api: Arc<dyn BoardApi>,
        cache: Arc<dyn BoardCache>,
        config: EngineConfig,
    ) -> Self {
        let notifier = Notifier::with_capacity(config.notice_capacity);

        let reorder = ReorderCoordinator::new(api.clone(), cache.clone(), notifier.clone())
            .with_debounce(Duration::from_millis(config.debounce_ms));
        let uploads = UploadScheduler::with_concurrency(
            api.clone(),
            cache.clone(),
            notifier.clone(),
            config.max_concurrent_uploads,
        );
        let loader = BoardLoader::new(api, cache);

        tracing::debug!(
            debounce_ms = config.debounce_ms,
            max_concurrent_uploads = config.max_concurrent_uploads,
            "Board sync engine ready"
        );

        Self {
            reorder,
            uploads,
            loader,
            notifier,
        }
    }
}
