//! Board session
//!
//! A [`BoardSession`] owns everything one mounted board needs: the category
//! store, the last fetched record snapshot, and the ephemeral view state
//! (optimistic moves, ordering policy, drag gestures). It is a cheap handle;
//! clones share the same state and dropping the last one discards it.
//!
//! Local state is only touched synchronously. Guards are never held across a
//! remote call, so the only suspension points are the store writes and
//! fetches themselves.

use crate::activity::{ActivityEntry, ActivityLog};
use crate::categories::CategoryStore;
use crate::config::BoardConfig;
use crate::drag::{DragOutcome, DragTracker};
use crate::error::{BoardError, Result};
use crate::grouper::{self, BoardView};
use crate::notify::{BoardObserver, LogNotifier, NoopObserver, Notifier};
use crate::pending::{PendingCategoryEdits, PendingMoves};
use crate::roles;
use crate::store::{RecordCategoryWrite, RemoteStore};
use crate::types::{
    Category, CategoryId, CategoryOrigin, OrderingPolicy, Record, RecordFilter, RecordId, Role,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Ephemeral per-session view state. Never persisted.
#[derive(Debug, Clone)]
pub struct BoardViewState {
    pub pending_moves: PendingMoves,
    pub ordering: OrderingPolicy,
    pending_edits: PendingCategoryEdits,
    record_drag: DragTracker<RecordId, CategoryId>,
    column_drag: DragTracker<CategoryId, usize>,
}

impl BoardViewState {
    pub fn new(ordering: OrderingPolicy) -> Self {
        Self {
            pending_moves: PendingMoves::new(),
            ordering,
            pending_edits: PendingCategoryEdits::new(),
            record_drag: DragTracker::new("record"),
            column_drag: DragTracker::new("column"),
        }
    }

    /// Role and column edits whose writes are still running
    pub fn pending_edits(&self) -> &PendingCategoryEdits {
        &self.pending_edits
    }

    pub fn dragging_record_id(&self) -> Option<&RecordId> {
        self.record_drag.dragging_item()
    }

    pub fn dragging_column_id(&self) -> Option<&CategoryId> {
        self.column_drag.dragging_item()
    }

    pub fn record_drag(&self) -> &DragTracker<RecordId, CategoryId> {
        &self.record_drag
    }

    pub fn column_drag(&self) -> &DragTracker<CategoryId, usize> {
        &self.column_drag
    }

    fn any_drag_active(&self) -> bool {
        self.record_drag.is_dragging() || self.column_drag.is_dragging()
    }
}

#[derive(Debug)]
struct BoardState {
    categories: CategoryStore,
    records: Vec<Record>,
    view: BoardViewState,
}

struct SessionInner {
    config: BoardConfig,
    filter: RecordFilter,
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn Notifier>,
    observer: Arc<dyn BoardObserver>,
    state: Mutex<BoardState>,
    activity: Mutex<ActivityLog>,
}

/// Handle to one mounted board
#[derive(Clone)]
pub struct BoardSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for BoardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardSession")
            .field("config", &self.inner.config)
            .field("filter", &self.inner.filter)
            .finish_non_exhaustive()
    }
}

/// Builder for [`BoardSession`]
pub struct BoardSessionBuilder {
    store: Arc<dyn RemoteStore>,
    config: BoardConfig,
    filter: RecordFilter,
    notifier: Arc<dyn Notifier>,
    observer: Arc<dyn BoardObserver>,
}

impl BoardSessionBuilder {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            config: BoardConfig::default(),
            filter: RecordFilter::default(),
            notifier: Arc::new(LogNotifier),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_config(mut self, config: BoardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BoardObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Filter passed to every record fetch
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Validate config and fetch categories and records once
    pub async fn open(self) -> Result<BoardSession> {
        self.config.validate()?;
        let fetch = self.store.fetch_categories().await?;
        let categories = CategoryStore::from_fetch(fetch)?;
        let records = self.store.fetch_records(&self.filter).await?;
        info!(
            categories = categories.len(),
            records = records.len(),
            "board session opened"
        );
        Ok(self.with_snapshot(categories, records))
    }

    /// Build a session over data the host already has
    pub fn with_snapshot(self, categories: CategoryStore, records: Vec<Record>) -> BoardSession {
        let view = BoardViewState::new(self.config.default_ordering);
        let activity = ActivityLog::new(self.config.activity_capacity);
        BoardSession {
            inner: Arc::new(SessionInner {
                config: self.config,
                filter: self.filter,
                store: self.store,
                notifier: self.notifier,
                observer: self.observer,
                state: Mutex::new(BoardState {
                    categories,
                    records,
                    view,
                }),
                activity: Mutex::new(activity),
            }),
        }
    }
}

/// An optimistic move awaiting its remote write.
///
/// Dropping the ticket without calling [`PendingMove::commit`] rolls the
/// optimistic entry back. See [`PendingMove::commit`] for what happens when
/// the commit itself is cancelled.
#[must_use = "a pending move is rolled back unless committed"]
#[derive(Debug)]
pub struct PendingMove {
    session: BoardSession,
    record_id: RecordId,
    from: CategoryId,
    to: CategoryId,
    origin_hint: CategoryOrigin,
    issued: bool,
    settled: bool,
}

/// Serializable description of a move for hosts and the activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveSummary {
    pub record_id: RecordId,
    pub from: CategoryId,
    pub to: CategoryId,
    pub origin_hint: CategoryOrigin,
}

impl PendingMove {
    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    pub fn from(&self) -> &CategoryId {
        &self.from
    }

    pub fn to(&self) -> &CategoryId {
        &self.to
    }

    pub fn origin_hint(&self) -> CategoryOrigin {
        self.origin_hint
    }

    pub fn summary(&self) -> MoveSummary {
        MoveSummary {
            record_id: self.record_id.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            origin_hint: self.origin_hint,
        }
    }

    /// Issue the remote write and reconcile the optimistic entry.
    ///
    /// If this future is dropped after the write was issued (a timeout or a
    /// losing `select!` branch), the write may still land. The record keeps
    /// rendering in the destination, but the entry is marked confirmed so it
    /// no longer blocks moves and the next [`BoardSession::refresh_records`]
    /// shows whatever the store actually holds.
    pub async fn commit(mut self) -> Result<MoveSummary> {
        let session = self.session.clone();
        let write = RecordCategoryWrite {
            category_id: self.to.clone(),
            origin_hint: self.origin_hint,
        };
        self.issued = true;
        let result = session
            .inner
            .store
            .write_record_category(&self.record_id, &write)
            .await;
        self.settled = true;

        match result {
            Ok(()) => {
                session.confirm_move(&self.record_id, &self.from, &self.to);
                Ok(self.summary())
            }
            Err(err) => {
                session.rollback_move(&self.record_id, &self.from, &self.to);
                warn!(
                    record = %self.record_id,
                    from = %self.from,
                    to = %self.to,
                    error = %err,
                    "record move failed, rolled back"
                );
                session
                    .inner
                    .notifier
                    .error(&session.inner.config.messages.move_failed);
                Err(err.into())
            }
        }
    }
}

impl Drop for PendingMove {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if self.issued {
            warn!(
                record = %self.record_id,
                to = %self.to,
                "move commit cancelled with its write outstanding, awaiting refresh"
            );
            self.session
                .state()
                .view
                .pending_moves
                .confirm(&self.record_id);
        } else {
            debug!(record = %self.record_id, "pending move dropped before commit");
            self.session
                .rollback_move(&self.record_id, &self.from, &self.to);
        }
    }
}

/// A column move already applied locally, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReorder {
    pub category: CategoryId,
    pub from: usize,
    pub to: usize,
    /// Every category whose index changed, with its new index
    pub changed: Vec<(CategoryId, usize)>,
    /// Full column order after the move
    pub order: Vec<CategoryId>,
}

impl BoardSession {
    pub fn builder(store: Arc<dyn RemoteStore>) -> BoardSessionBuilder {
        BoardSessionBuilder::new(store)
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.inner.config
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.inner.filter
    }

    pub fn categories(&self) -> CategoryStore {
        self.state().categories.clone()
    }

    pub fn records(&self) -> Vec<Record> {
        self.state().records.clone()
    }

    pub fn record(&self, id: &RecordId) -> Option<Record> {
        self.state().records.iter().find(|r| &r.id == id).cloned()
    }

    pub fn pending_moves(&self) -> PendingMoves {
        self.state().view.pending_moves.clone()
    }

    pub fn view_state(&self) -> BoardViewState {
        self.state().view.clone()
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.state().view.ordering
    }

    /// Switch the ordering policy, returning the previous one
    pub fn set_ordering(&self, policy: OrderingPolicy) -> OrderingPolicy {
        let previous = std::mem::replace(&mut self.state().view.ordering, policy);
        if previous != policy {
            debug!(from = %previous, to = %policy, "ordering policy changed");
        }
        previous
    }

    /// Category a record currently renders in
    pub fn effective_category(&self, record: &RecordId) -> Option<CategoryId> {
        let state = self.state();
        state
            .records
            .iter()
            .find(|r| &r.id == record)
            .and_then(|r| grouper::effective_category(r, &state.view.pending_moves))
            .cloned()
    }

    /// Group the current snapshot into the per-column view model
    pub fn render(&self) -> BoardView {
        let state = self.state();
        grouper::render_board(
            &state.records,
            &state.categories,
            &state.view.pending_moves,
            state.view.ordering,
        )
    }

    /// Render under `policy` without changing the session's policy
    pub fn render_with(&self, policy: OrderingPolicy) -> BoardView {
        let state = self.state();
        grouper::render_board(
            &state.records,
            &state.categories,
            &state.view.pending_moves,
            policy,
        )
    }

    // Snapshots

    /// Install a freshly fetched record snapshot.
    ///
    /// In-flight optimistic entries survive; confirmed ones are superseded.
    pub fn replace_records(&self, records: Vec<Record>) {
        let mut state = self.state();
        let settled = state.view.pending_moves.settle_confirmed();
        debug!(
            records = records.len(),
            settled,
            in_flight = state.view.pending_moves.len(),
            "record snapshot replaced"
        );
        state.records = records;
    }

    pub async fn refresh_records(&self) -> Result<usize> {
        let records = self.inner.store.fetch_records(&self.inner.filter).await?;
        let count = records.len();
        self.replace_records(records);
        Ok(count)
    }

    /// Install a freshly fetched category store.
    ///
    /// Role and column edits whose writes are still running are re-applied
    /// on top of it.
    pub fn replace_categories(&self, mut categories: CategoryStore) {
        let mut state = self.state();
        let edits = &state.view.pending_edits;
        if !edits.is_empty() {
            debug!(pending = edits.len(), "re-applying pending category edits");
            edits.apply_to(&mut categories);
        }
        debug!(categories = categories.len(), "category store replaced");
        state.categories = categories;
    }

    pub async fn refresh_categories(&self) -> Result<usize> {
        let fetch = self.inner.store.fetch_categories().await?;
        let categories = CategoryStore::from_fetch(fetch)?;
        let count = categories.len();
        self.replace_categories(categories);
        Ok(count)
    }

    // Record moves

    /// Apply a cross-column move locally and hand back the write ticket.
    ///
    /// Returns `Ok(None)` when `from == to`.
    pub fn begin_move(
        &self,
        record_id: &RecordId,
        from: &CategoryId,
        to: &CategoryId,
    ) -> Result<Option<PendingMove>> {
        if from == to {
            debug!(record = %record_id, category = %from, "same-column drop, nothing to persist");
            return Ok(None);
        }

        let applied = {
            let mut state = self.state();
            Self::apply_move(&mut state, record_id, from, to)
        };

        match applied {
            Ok(origin_hint) => {
                debug!(
                    record = %record_id,
                    %from,
                    %to,
                    origin = ?origin_hint,
                    "optimistic move applied"
                );
                Ok(Some(PendingMove {
                    session: self.clone(),
                    record_id: record_id.clone(),
                    from: from.clone(),
                    to: to.clone(),
                    origin_hint,
                    issued: false,
                    settled: false,
                }))
            }
            Err(err) => {
                warn!(record = %record_id, %from, %to, error = %err, "record move rejected");
                let messages = &self.inner.config.messages;
                let message = match &err {
                    BoardError::MoveInProgress { .. } => &messages.move_in_progress,
                    _ => &messages.move_failed,
                };
                self.inner.notifier.error(message);
                Err(err)
            }
        }
    }

    fn apply_move(
        state: &mut BoardState,
        record_id: &RecordId,
        from: &CategoryId,
        to: &CategoryId,
    ) -> Result<CategoryOrigin> {
        if state.view.pending_moves.is_in_flight(record_id) {
            return Err(BoardError::MoveInProgress {
                id: record_id.to_string(),
            });
        }
        let record = state
            .records
            .iter()
            .find(|r| &r.id == record_id)
            .ok_or_else(|| BoardError::record_not_found(record_id))?;
        if grouper::effective_category(record, &state.view.pending_moves) != Some(from) {
            return Err(BoardError::stale_source(record_id, from));
        }
        let origin_hint = state
            .categories
            .origin_of(to)
            .ok_or_else(|| BoardError::category_not_found(to))?;
        state
            .view
            .pending_moves
            .begin(record_id.clone(), from.clone(), to.clone());
        Ok(origin_hint)
    }

    fn confirm_move(&self, record_id: &RecordId, from: &CategoryId, to: &CategoryId) {
        self.state().view.pending_moves.confirm(record_id);
        info!(record = %record_id, %from, %to, "record moved");
        self.inner.observer.on_record_moved(record_id, from, to);
        if self.inner.config.notify_success {
            self.inner.notifier.success(&self.inner.config.messages.moved);
        }
    }

    /// Drop the optimistic entry and restore `from` on the snapshot
    fn rollback_move(&self, record_id: &RecordId, from: &CategoryId, to: &CategoryId) {
        let mut state = self.state();
        let ours = state
            .view
            .pending_moves
            .get(record_id)
            .is_some_and(|entry| &entry.category_id == to);
        if ours {
            state.view.pending_moves.remove(record_id);
        }
        if let Some(record) = state.records.iter_mut().find(|r| &r.id == record_id) {
            if record.category_id.as_ref() != Some(from) {
                debug!(record = %record_id, %from, "restoring origin category on snapshot");
                record.category_id = Some(from.clone());
            }
        }
    }

    /// Move a record to another category: optimistic apply, then remote write.
    ///
    /// Returns `Ok(None)` for a same-column move.
    pub async fn move_record(
        &self,
        record_id: &RecordId,
        from: &CategoryId,
        to: &CategoryId,
    ) -> Result<Option<MoveSummary>> {
        match self.begin_move(record_id, from, to)? {
            Some(pending) => pending.commit().await.map(Some),
            None => Ok(None),
        }
    }

    /// Move a record out of whatever column it currently renders in
    pub async fn move_record_to(
        &self,
        record_id: &RecordId,
        to: &CategoryId,
    ) -> Result<Option<MoveSummary>> {
        match self.effective_category(record_id) {
            Some(from) => self.move_record(record_id, &from, to).await,
            None => {
                warn!(record = %record_id, %to, "record is not on the board");
                self.inner
                    .notifier
                    .error(&self.inner.config.messages.move_failed);
                Err(BoardError::record_not_found(record_id))
            }
        }
    }

    // Record drag

    /// Start dragging a record out of the column it renders in.
    ///
    /// Ignored while any drag is active or when the record is not on the board.
    pub fn start_record_drag(&self, record_id: &RecordId) -> bool {
        let mut state = self.state();
        if state.view.any_drag_active() {
            debug!(record = %record_id, "record drag ignored, a drag is already active");
            return false;
        }
        let source = state
            .records
            .iter()
            .find(|r| &r.id == record_id)
            .and_then(|r| grouper::effective_category(r, &state.view.pending_moves))
            .filter(|id| state.categories.contains(id))
            .cloned();
        match source {
            Some(source) => state.view.record_drag.start(record_id.clone(), source),
            None => {
                debug!(record = %record_id, "record drag ignored, record is not on the board");
                false
            }
        }
    }

    /// Highlight a candidate destination column
    pub fn drag_record_over(&self, category: Option<CategoryId>) {
        self.state().view.record_drag.hover(category);
    }

    pub fn cancel_record_drag(&self) {
        self.state().view.record_drag.cancel();
    }

    /// Finish a record drag. A drop on another column starts a move.
    pub fn end_record_drag(&self, destination: Option<CategoryId>) -> Result<Option<PendingMove>> {
        let outcome = self.state().view.record_drag.release(destination);
        match outcome {
            DragOutcome::Moved { item, from, to } => self.begin_move(&item, &from, &to),
            _ => Ok(None),
        }
    }

    /// Finish a record drag and await the resulting write, if any
    pub async fn drop_record(
        &self,
        destination: Option<CategoryId>,
    ) -> Result<Option<MoveSummary>> {
        match self.end_record_drag(destination)? {
            Some(pending) => pending.commit().await.map(Some),
            None => Ok(None),
        }
    }

    // Column reorder

    /// Start dragging a column by its category id
    pub fn start_column_drag(&self, category: &CategoryId) -> bool {
        let mut state = self.state();
        if state.view.any_drag_active() {
            debug!(%category, "column drag ignored, a drag is already active");
            return false;
        }
        match state.categories.index_of(category) {
            Some(index) => state.view.column_drag.start(category.clone(), index),
            None => false,
        }
    }

    pub fn drag_column_over(&self, index: Option<usize>) {
        self.state().view.column_drag.hover(index);
    }

    pub fn cancel_column_drag(&self) {
        self.state().view.column_drag.cancel();
    }

    /// Finish a column drag, reordering locally. Persist with
    /// [`BoardSession::persist_column_order`].
    pub fn end_column_drag(&self, destination: Option<usize>) -> Result<Option<ColumnReorder>> {
        let outcome = self.state().view.column_drag.release(destination);
        match outcome {
            DragOutcome::Moved { item, to, .. } => self.apply_category_move(&item, to),
            _ => Ok(None),
        }
    }

    /// Resolve the category's current index, then move it locally.
    /// Indices may have shifted since a drag started.
    fn apply_category_move(
        &self,
        category: &CategoryId,
        to: usize,
    ) -> Result<Option<ColumnReorder>> {
        let from = self.state().categories.index_of(category);
        match from {
            Some(from) => self.apply_column_move(from, to),
            None => {
                warn!(%category, "column no longer exists");
                self.inner
                    .notifier
                    .error(&self.inner.config.messages.reorder_failed);
                Err(BoardError::category_not_found(category))
            }
        }
    }

    /// Move a column, identified by category, to index `to` and persist
    pub async fn move_column(
        &self,
        category: &CategoryId,
        to: usize,
    ) -> Result<Option<ColumnReorder>> {
        match self.apply_category_move(category, to)? {
            Some(reorder) => self.persist_column_order(reorder).await.map(Some),
            None => Ok(None),
        }
    }

    /// Finish a column drag and persist the new order
    pub async fn drop_column(&self, destination: Option<usize>) -> Result<Option<ColumnReorder>> {
        match self.end_column_drag(destination)? {
            Some(reorder) => self.persist_column_order(reorder).await.map(Some),
            None => Ok(None),
        }
    }

    /// Move the column at `from` to index `to` and persist the new order
    pub async fn reorder_columns(&self, from: usize, to: usize) -> Result<Option<ColumnReorder>> {
        match self.apply_column_move(from, to)? {
            Some(reorder) => self.persist_column_order(reorder).await.map(Some),
            None => Ok(None),
        }
    }

    fn apply_column_move(&self, from: usize, to: usize) -> Result<Option<ColumnReorder>> {
        let applied = {
            let mut state = self.state();
            let category = state.categories.as_slice().get(from).map(|c| c.id.clone());
            state.categories.move_column(from, to).map(|changed| {
                let order: Vec<CategoryId> =
                    state.categories.iter().map(|c| c.id.clone()).collect();
                (category, changed, order)
            })
        };

        match applied {
            Ok((Some(category), changed, order)) if !changed.is_empty() => {
                debug!(%category, from, to, changed = changed.len(), "columns reordered locally");
                Ok(Some(ColumnReorder {
                    category,
                    from,
                    to,
                    changed,
                    order,
                }))
            }
            Ok(_) => Ok(None),
            Err(err) => {
                warn!(from, to, error = %err, "column reorder rejected");
                self.inner
                    .notifier
                    .error(&self.inner.config.messages.reorder_failed);
                Err(err)
            }
        }
    }

    /// Write the new index of every moved column. Local order is kept on
    /// failure, and held over any category refresh until the writes finish.
    pub async fn persist_column_order(&self, reorder: ColumnReorder) -> Result<ColumnReorder> {
        let ticket = self
            .state()
            .view
            .pending_edits
            .begin_order(reorder.order.clone());
        let written = self.write_column_order(&reorder).await;
        self.finish_category_edit(ticket);
        written?;

        let order: Vec<Category> = self.state().categories.as_slice().to_vec();
        info!(
            category = %reorder.category,
            from = reorder.from,
            to = reorder.to,
            "column order saved"
        );
        self.inner.observer.on_column_reordered(&order);
        if self.inner.config.notify_success {
            self.inner
                .notifier
                .success(&self.inner.config.messages.reordered);
        }
        Ok(reorder)
    }

    async fn write_column_order(&self, reorder: &ColumnReorder) -> Result<()> {
        for (category, index) in &reorder.changed {
            if let Err(err) = self.inner.store.write_column_order(category, *index).await {
                warn!(%category, index, error = %err, "column order write failed");
                self.inner
                    .notifier
                    .error(&self.inner.config.messages.reorder_failed);
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn finish_category_edit(&self, ticket: u64) {
        self.state().view.pending_edits.finish(ticket);
    }

    // Roles

    /// Give `role` to `category`, taking it away from its current holder.
    ///
    /// Both local changes land together. If a remote write fails the
    /// authoritative role mapping is fetched again.
    pub async fn assign_role(
        &self,
        category: &CategoryId,
        role: Option<Role>,
    ) -> Result<roles::RoleChange> {
        let planned = {
            let mut state = self.state();
            roles::plan(&state.categories, category, role).and_then(|change| {
                if change.is_noop() {
                    return Ok((change, None));
                }
                roles::apply(&mut state.categories, &change)?;
                let ticket = state.view.pending_edits.begin_role(change.clone());
                Ok((change, Some(ticket)))
            })
        };

        let (change, ticket) = match planned {
            Ok(change) => change,
            Err(err) => {
                warn!(%category, ?role, error = %err, "role assignment rejected");
                self.inner
                    .notifier
                    .error(&self.inner.config.messages.role_failed);
                return Err(err);
            }
        };
        let Some(ticket) = ticket else {
            debug!(%category, ?role, "role already assigned");
            return Ok(change);
        };

        for (id, value) in change.writes() {
            if let Err(err) = self.inner.store.write_category_role(&id, value).await {
                warn!(
                    category = %id,
                    role = ?value,
                    error = %err,
                    "role write failed, refetching roles"
                );
                self.finish_category_edit(ticket);
                self.inner
                    .notifier
                    .error(&self.inner.config.messages.role_failed);
                if let Err(refetch) = self.refresh_categories().await {
                    warn!(error = %refetch, "role refetch failed");
                }
                return Err(err.into());
            }
        }

        self.finish_category_edit(ticket);
        info!(%category, ?role, displaced = ?change.displaced, "role assigned");
        self.inner.observer.on_role_changed(category, role);
        if let Some(displaced) = &change.displaced {
            self.inner.observer.on_role_changed(displaced, None);
        }
        if self.inner.config.notify_success {
            self.inner
                .notifier
                .success(&self.inner.config.messages.role_updated);
        }
        Ok(change)
    }

    // Activity

    /// Most recent activity, newest first
    pub fn activity(&self, limit: Option<usize>) -> Vec<ActivityEntry> {
        self.inner
            .activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recent(limit)
    }

    pub(crate) fn record_activity(&self, entry: ActivityEntry) {
        debug!(op = %entry.op, id = %entry.id, "activity recorded");
        self.inner
            .activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::memory::InMemoryStore;
    use crate::pending::MoveStatus;

    fn snapshot_session() -> BoardSession {
        let categories = CategoryStore::new(vec![
            Category::new("lead", "Lead", CategoryOrigin::System, 0),
            Category::new("won", "Won", CategoryOrigin::System, 1),
        ])
        .unwrap();
        BoardSession::builder(Arc::new(InMemoryStore::new()))
            .with_config(BoardConfig::default().with_ordering(OrderingPolicy::ValueAsc))
            .with_snapshot(categories, vec![Record::new("x", "lead", 0.0)])
    }

    #[test]
    fn test_with_snapshot_uses_config_ordering() {
        let session = snapshot_session();
        assert_eq!(session.ordering(), OrderingPolicy::ValueAsc);
        assert_eq!(session.set_ordering(OrderingPolicy::Manual), OrderingPolicy::ValueAsc);
        assert_eq!(session.render().total_records(), 1);
    }

    #[test]
    fn test_replace_records_settles_only_confirmed() {
        let session = snapshot_session();
        {
            let mut state = session.state();
            state.view.pending_moves.begin("x".into(), "lead".into(), "won".into());
            state.view.pending_moves.begin("y".into(), "lead".into(), "won".into());
            state.view.pending_moves.confirm(&"y".into());
        }

        session.replace_records(vec![Record::new("x", "lead", 0.0)]);

        let pending = session.pending_moves();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.get(&"x".into()).unwrap().status, MoveStatus::InFlight);
        assert_eq!(session.effective_category(&"x".into()).unwrap().as_str(), "won");
    }

    #[test]
    fn test_begin_move_rejects_unknown_destination() {
        let session = snapshot_session();
        let err = session
            .begin_move(&"x".into(), &"lead".into(), &"gone".into())
            .unwrap_err();
        assert!(matches!(err, BoardError::CategoryNotFound { .. }));
        assert!(session.pending_moves().is_empty());
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_config() {
        let err = BoardSession::builder(Arc::new(fixtures::store()))
            .with_config(BoardConfig::default().with_activity_capacity(0))
            .open()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[tokio::test]
    async fn test_open_applies_filter() {
        let session = BoardSession::builder(Arc::new(fixtures::store()))
            .with_filter(RecordFilter::default().with_search("zed"))
            .open()
            .await
            .unwrap();
        let records = session.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "z");
    }
}
