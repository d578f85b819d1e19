//! Integration tests for optimistic record moves and record drags

use pipeline_board::{
    BoardConfig, BoardError, BoardObserver, BoardSession, CategoryId, ErrorKind, FetchedCategory,
    InMemoryStore, MoveStatus, NotificationLevel, Record, RecordId, RecordingNotifier, StoreWrite,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct MoveLog {
    moves: Mutex<Vec<(String, String, String)>>,
}

impl BoardObserver for MoveLog {
    fn on_record_moved(&self, record: &RecordId, from: &CategoryId, to: &CategoryId) {
        self.moves
            .lock()
            .unwrap()
            .push((record.to_string(), from.to_string(), to.to_string()));
    }
}

/// `[Lead(order=0), Active(order=1), Won(order=2)]`, record X in Lead
fn store() -> InMemoryStore {
    InMemoryStore::new()
        .with_system_category(FetchedCategory::new("lead", "Lead", 0))
        .with_custom_category(FetchedCategory::new("active", "Active", 1))
        .with_system_category(FetchedCategory::new("won", "Won", 2))
        .with_records([
            Record::new("x", "lead", 0.0),
            Record::new("y", "lead", 1.0),
            Record::new("z", "active", 0.0),
        ])
}

struct Board {
    store: Arc<InMemoryStore>,
    session: BoardSession,
    notifier: Arc<RecordingNotifier>,
    observer: Arc<MoveLog>,
}

async fn open(store: InMemoryStore) -> Board {
    let store = Arc::new(store);
    let notifier = Arc::new(RecordingNotifier::new());
    let observer = Arc::new(MoveLog::default());
    let session = BoardSession::builder(store.clone())
        .with_config(BoardConfig::default().with_notify_success(false))
        .with_notifier(notifier.clone())
        .with_observer(observer.clone())
        .open()
        .await
        .unwrap();
    Board {
        store,
        session,
        notifier,
        observer,
    }
}

fn ids(session: &BoardSession, column: &str) -> Vec<String> {
    session
        .render()
        .record_ids(&column.into())
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

#[test_log::test(tokio::test)]
async fn test_optimistic_move_renders_before_write() {
    let board = open(store()).await;
    let x = RecordId::from("x");

    let pending = board
        .session
        .begin_move(&x, &"lead".into(), &"won".into())
        .unwrap()
        .unwrap();

    // Nothing written yet, but the board already shows the result
    assert!(board.store.journal().is_empty());
    let entry = board.session.pending_moves().get(&x).cloned().unwrap();
    assert_eq!(entry.category_id.as_str(), "won");
    assert_eq!(entry.origin.as_str(), "lead");
    assert_eq!(ids(&board.session, "won"), vec!["x"]);
    assert_eq!(ids(&board.session, "lead"), vec!["y"]);
    let view = board.session.render();
    let card = &view.column(&"won".into()).unwrap().records[0];
    assert_eq!(card.category_id, Some("won".into()));
    // Snapshot still says Lead
    assert_eq!(board.session.record(&x).unwrap().category_id, Some("lead".into()));

    pending.commit().await.unwrap();
    assert_eq!(board.store.journal().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_successful_move_changes_only_the_moved_record() {
    let board = open(store()).await;
    let before = board.session.render();

    board
        .session
        .move_record(&"x".into(), &"lead".into(), &"won".into())
        .await
        .unwrap();

    let after = board.session.render();
    assert_eq!(after.column_of(&"x".into()).unwrap().as_str(), "won");
    assert!(!after.column(&"lead".into()).unwrap().contains(&"x".into()));
    for other in ["y", "z"] {
        assert_eq!(
            before.column_of(&other.into()),
            after.column_of(&other.into())
        );
    }

    // Confirmed entry stays until the next refresh supersedes it
    let pending = board.session.pending_moves();
    assert_eq!(pending.get(&"x".into()).unwrap().status, MoveStatus::Confirmed);
    assert_eq!(
        *board.observer.moves.lock().unwrap(),
        vec![("x".to_string(), "lead".to_string(), "won".to_string())]
    );

    board.session.refresh_records().await.unwrap();
    assert!(board.session.pending_moves().is_empty());
    assert_eq!(ids(&board.session, "won"), vec!["x"]);
    assert!(board.notifier.errors().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_failed_move_rolls_back_with_one_error() {
    let board = open(store()).await;
    board.store.fail_next_writes(1);

    let err = board
        .session
        .move_record(&"x".into(), &"lead".into(), &"won".into())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransientWrite);
    assert!(err.is_retryable());
    assert!(board.session.pending_moves().is_empty());
    assert_eq!(ids(&board.session, "lead"), vec!["x", "y"]);
    assert!(ids(&board.session, "won").is_empty());
    assert_eq!(board.notifier.count(NotificationLevel::Error), 1);
    assert_eq!(
        board.notifier.errors()[0],
        BoardConfig::default().messages.move_failed
    );
    assert!(board.observer.moves.lock().unwrap().is_empty());

    // Retrying the gesture works
    board
        .session
        .move_record(&"x".into(), &"lead".into(), &"won".into())
        .await
        .unwrap();
    assert_eq!(ids(&board.session, "won"), vec!["x"]);
}

#[test_log::test(tokio::test)]
async fn test_refresh_during_in_flight_move_keeps_optimistic_entry() {
    let board = open(store()).await;
    let pending = board
        .session
        .begin_move(&"x".into(), &"lead".into(), &"won".into())
        .unwrap()
        .unwrap();

    // Remote still says Lead
    board.session.refresh_records().await.unwrap();
    assert_eq!(ids(&board.session, "won"), vec!["x"]);

    pending.commit().await.unwrap();
    assert_eq!(ids(&board.session, "won"), vec!["x"]);
}

#[test_log::test(tokio::test)]
async fn test_rollback_is_exact_after_concurrent_refresh() {
    let board = open(store()).await;
    let pending = board
        .session
        .begin_move(&"x".into(), &"lead".into(), &"won".into())
        .unwrap()
        .unwrap();

    // Another client moved x to Active meanwhile
    board.store.put_record(Record::new("x", "active", 0.0));
    board.session.refresh_records().await.unwrap();
    assert_eq!(ids(&board.session, "won"), vec!["x"]);

    board.store.fail_next_writes(1);
    pending.commit().await.unwrap_err();

    // Restored to where the drag started, not to whatever the refresh said
    assert_eq!(ids(&board.session, "lead"), vec!["x", "y"]);
    assert_eq!(ids(&board.session, "active"), vec!["z"]);
    assert_eq!(board.notifier.errors().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_same_column_move_is_a_noop() {
    let board = open(store()).await;

    let moved = board
        .session
        .move_record(&"x".into(), &"lead".into(), &"lead".into())
        .await
        .unwrap();

    assert!(moved.is_none());
    assert!(board.session.pending_moves().is_empty());
    assert!(board.store.journal().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_second_move_of_same_record_is_rejected() {
    let board = open(store()).await;
    let first = board
        .session
        .begin_move(&"x".into(), &"lead".into(), &"won".into())
        .unwrap()
        .unwrap();

    let err = board
        .session
        .begin_move(&"x".into(), &"won".into(), &"active".into())
        .unwrap_err();
    assert!(matches!(err, BoardError::MoveInProgress { .. }));
    assert_eq!(
        board.notifier.errors(),
        vec![BoardConfig::default().messages.move_in_progress]
    );

    // The first move is untouched
    assert_eq!(ids(&board.session, "won"), vec!["x"]);
    first.commit().await.unwrap();

    // Once resolved, the record can move again
    board
        .session
        .move_record(&"x".into(), &"won".into(), &"active".into())
        .await
        .unwrap();
    board.session.refresh_records().await.unwrap();
    assert_eq!(ids(&board.session, "active"), vec!["z", "x"]);
}

#[test_log::test(tokio::test)]
async fn test_moves_of_different_records_are_independent() {
    let board = open(store().with_latency(Duration::from_millis(20))).await;

    let first = board.session.clone();
    let second = board.session.clone();
    let (a, b) = tokio::join!(
        async move {
            first
                .move_record(&"x".into(), &"lead".into(), &"won".into())
                .await
        },
        async move {
            second
                .move_record(&"z".into(), &"active".into(), &"won".into())
                .await
        },
    );
    a.unwrap();
    b.unwrap();

    let mut won = ids(&board.session, "won");
    won.sort();
    assert_eq!(won, vec!["x", "z"]);
    assert_eq!(board.store.journal().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_move_to_deleted_category_behaves_like_failure() {
    let board = open(store()).await;
    board.store.remove_category(&"won".into());
    board.session.refresh_categories().await.unwrap();

    let err = board
        .session
        .move_record(&"x".into(), &"lead".into(), &"won".into())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StaleReference);
    assert!(board.session.pending_moves().is_empty());
    assert_eq!(ids(&board.session, "lead"), vec!["x", "y"]);
    assert_eq!(board.notifier.errors().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_category_deleted_remotely_mid_flight() {
    let board = open(store()).await;
    let pending = board
        .session
        .begin_move(&"x".into(), &"lead".into(), &"won".into())
        .unwrap()
        .unwrap();
    board.store.remove_category(&"won".into());

    let err = pending.commit().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StaleReference);
    assert_eq!(ids(&board.session, "lead"), vec!["x", "y"]);
    assert_eq!(board.notifier.errors().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_move_from_wrong_column_is_rejected() {
    let board = open(store()).await;
    board.store.fail_next_writes(1);

    // x sits in Lead, not Won
    let err = board
        .session
        .move_record(&"x".into(), &"won".into(), &"active".into())
        .await
        .unwrap_err();

    assert!(matches!(err, BoardError::StaleSource { .. }));
    assert_eq!(err.kind(), ErrorKind::StaleReference);
    assert!(board.session.pending_moves().is_empty());
    assert_eq!(ids(&board.session, "lead"), vec!["x", "y"]);
    assert!(ids(&board.session, "won").is_empty());
    assert_eq!(
        board.session.record(&"x".into()).unwrap().category_id,
        Some("lead".into())
    );
    // Rejected before any write was issued
    assert_eq!(board.store.failed_writes(), 0);
    assert_eq!(
        board.notifier.errors(),
        vec![BoardConfig::default().messages.move_failed]
    );
}

#[test_log::test(tokio::test)]
async fn test_cancelled_commit_defers_to_refresh() {
    let board = open(store().with_latency(Duration::from_millis(50))).await;
    let x = RecordId::from("x");
    let pending = board
        .session
        .begin_move(&x, &"lead".into(), &"won".into())
        .unwrap()
        .unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(10), pending.commit()).await;
    assert!(timed_out.is_err());

    // Outcome unknown: still shown in Won, but no longer blocking moves
    assert_eq!(ids(&board.session, "won"), vec!["x"]);
    let entry = board.session.pending_moves().get(&x).cloned().unwrap();
    assert_eq!(entry.status, MoveStatus::Confirmed);
    assert!(board.notifier.errors().is_empty());

    // The write never landed, so the refresh puts x back in Lead
    board.session.refresh_records().await.unwrap();
    assert!(board.store.journal().is_empty());
    assert!(board.session.pending_moves().is_empty());
    assert_eq!(ids(&board.session, "lead"), vec!["x", "y"]);
}

#[test_log::test(tokio::test)]
async fn test_dropped_ticket_rolls_back() {
    let board = open(store()).await;
    {
        let _pending = board
            .session
            .begin_move(&"x".into(), &"lead".into(), &"won".into())
            .unwrap();
        assert_eq!(ids(&board.session, "won"), vec!["x"]);
    }

    assert!(board.session.pending_moves().is_empty());
    assert_eq!(ids(&board.session, "lead"), vec!["x", "y"]);
    assert!(board.store.journal().is_empty());
    assert!(board.notifier.errors().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_success_notification_when_enabled() {
    let store = Arc::new(store());
    let notifier = Arc::new(RecordingNotifier::new());
    let session = BoardSession::builder(store)
        .with_notifier(notifier.clone())
        .open()
        .await
        .unwrap();

    session
        .move_record(&"x".into(), &"lead".into(), &"active".into())
        .await
        .unwrap();
    assert_eq!(notifier.count(NotificationLevel::Success), 1);
}

// Record drags

#[test_log::test(tokio::test)]
async fn test_record_drag_drop_moves() {
    let board = open(store()).await;

    assert!(board.session.start_record_drag(&"x".into()));
    let view = board.session.view_state();
    assert_eq!(view.dragging_record_id(), Some(&RecordId::from("x")));
    assert_eq!(view.record_drag().over(), Some(&CategoryId::from("lead")));

    board.session.drag_record_over(Some("active".into()));
    board.session.drag_record_over(Some("won".into()));
    // Hovering mutates nothing durable
    assert!(board.session.pending_moves().is_empty());

    let moved = board
        .session
        .drop_record(Some("won".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.from.as_str(), "lead");
    assert_eq!(moved.to.as_str(), "won");
    assert!(board.session.view_state().dragging_record_id().is_none());
    assert_eq!(
        board.store.journal(),
        vec![StoreWrite::RecordCategory {
            record_id: "x".into(),
            category_id: "won".into(),
            origin_hint: pipeline_board::CategoryOrigin::System,
        }]
    );
}

#[test_log::test(tokio::test)]
async fn test_record_drag_cancel_and_drop_on_source() {
    let board = open(store()).await;

    assert!(board.session.start_record_drag(&"x".into()));
    board.session.drag_record_over(Some("won".into()));
    board.session.cancel_record_drag();
    assert!(board.session.view_state().dragging_record_id().is_none());

    assert!(board.session.start_record_drag(&"x".into()));
    board.session.drag_record_over(Some("won".into()));
    let moved = board.session.drop_record(Some("lead".into())).await.unwrap();
    assert!(moved.is_none());

    assert!(board.session.start_record_drag(&"x".into()));
    let moved = board.session.drop_record(None).await.unwrap();
    assert!(moved.is_none());

    assert!(board.store.journal().is_empty());
    assert!(board.session.pending_moves().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_drag_start_ignored_while_dragging() {
    let board = open(store()).await;

    assert!(board.session.start_record_drag(&"x".into()));
    assert!(!board.session.start_record_drag(&"y".into()));
    assert!(!board.session.start_column_drag(&"lead".into()));
    assert_eq!(
        board.session.view_state().dragging_record_id(),
        Some(&RecordId::from("x"))
    );

    board.session.cancel_record_drag();
    assert!(board.session.start_column_drag(&"lead".into()));
    assert!(!board.session.start_record_drag(&"y".into()));
}

#[test_log::test(tokio::test)]
async fn test_drag_of_unknown_record_is_ignored() {
    let board = open(store().with_record(Record::uncategorized("loose"))).await;

    assert!(!board.session.start_record_drag(&"ghost".into()));
    assert!(!board.session.start_record_drag(&"loose".into()));
    assert!(board.session.view_state().dragging_record_id().is_none());
}

#[test_log::test(tokio::test)]
async fn test_drag_starts_from_optimistic_column() {
    let board = open(store()).await;
    let pending = board
        .session
        .begin_move(&"x".into(), &"lead".into(), &"won".into())
        .unwrap()
        .unwrap();
    pending.commit().await.unwrap();

    assert!(board.session.start_record_drag(&"x".into()));
    assert_eq!(
        board.session.view_state().record_drag().source(),
        Some(&CategoryId::from("won"))
    );
    board
        .session
        .drop_record(Some("active".into()))
        .await
        .unwrap();
    // Server appends to the end of the column
    board.session.refresh_records().await.unwrap();
    assert_eq!(ids(&board.session, "active"), vec!["z", "x"]);
}
