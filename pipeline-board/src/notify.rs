//! User notifications and host hooks

use crate::types::{Category, CategoryId, RecordId, Role};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Fire-and-forget toast surface. Nothing is returned to the board.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);

    fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.notify(NotificationLevel::Success, message);
    }
}

/// Notifier that only writes to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Error => error!(target: "pipeline_board::notify", "{}", message),
            NotificationLevel::Warning => warn!(target: "pipeline_board::notify", "{}", message),
            NotificationLevel::Info | NotificationLevel::Success => {
                info!(target: "pipeline_board::notify", "{}", message)
            }
        }
    }
}

/// Notifier that keeps every notification, for tests and headless hosts
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.level == level)
            .count()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification::new(level, message));
    }
}

/// Callbacks the host can use to trigger secondary refreshes
/// (aggregate counts and the like). Called after a remote write succeeds.
pub trait BoardObserver: Send + Sync {
    fn on_record_moved(&self, _record: &RecordId, _from: &CategoryId, _to: &CategoryId) {}

    /// `order` is the full column order after the move
    fn on_column_reordered(&self, _order: &[Category]) {}

    fn on_role_changed(&self, _category: &CategoryId, _role: Option<Role>) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BoardObserver for NoopObserver {}
