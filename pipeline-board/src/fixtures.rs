//! Shared test fixtures

use crate::memory::InMemoryStore;
use crate::notify::RecordingNotifier;
use crate::session::BoardSession;
use crate::types::{FetchedCategory, Record, Role, ValueMetrics};
use std::sync::Arc;

/// Lead (system) | Active (custom) | Won (system), with x and y in Lead and
/// z in Active
pub(crate) fn store() -> InMemoryStore {
    InMemoryStore::new()
        .with_system_category(FetchedCategory::new("lead", "Lead", 0))
        .with_custom_category(FetchedCategory::new("active", "Active", 1).with_color("#22c55e"))
        .with_system_category(FetchedCategory::new("won", "Won", 2))
        .with_role(Role::Lead, "lead")
        .with_role(Role::Won, "won")
        .with_records([
            Record::new("x", "lead", 0.0)
                .with_name("Xavier")
                .with_values(ValueMetrics::new(100.0, 0.0, 0.0)),
            Record::new("y", "lead", 1.0).with_name("Yolanda"),
            Record::new("z", "active", 0.0)
                .with_name("Zed")
                .with_values(ValueMetrics::new(0.0, 50.0, 25.0)),
        ])
}

pub(crate) async fn session(store: Arc<InMemoryStore>) -> (BoardSession, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let session = BoardSession::builder(store)
        .with_notifier(notifier.clone())
        .open()
        .await
        .unwrap();
    (session, notifier)
}
