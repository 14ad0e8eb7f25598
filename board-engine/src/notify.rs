//! User-facing notices
//!
//! The engine decides what to tell the user and when; how the message is
//! rendered (toast, status bar) is the embedding application's concern.
//! Subscribers receive notices over a broadcast channel.

use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserNotice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Fan-out channel for user notices.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<UserNotice>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UserNotice> {
        self.tx.subscribe()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(NoticeLevel::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(NoticeLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(NoticeLevel::Error, message.into());
    }

    fn emit(&self, level: NoticeLevel, message: String) {
        tracing::debug!(level = ?level, message = %message, "User notice");
        // No subscribers is not an error.
        let _ = self.tx.send(UserNotice { level, message });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
