//! Optimistic overlays
//!
//! Record moves are layered on top of the last fetched record snapshot when
//! the board is grouped. Role and column edits are layered on top of every
//! category snapshot installed while their writes run. A refresh never
//! overwrites a change whose write is still in flight.

use crate::categories::CategoryStore;
use crate::roles::{self, RoleChange};
use crate::types::{CategoryId, RecordId};
use serde::Serialize;
use std::collections::HashMap;

/// Lifecycle of an optimistic entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    /// Remote write issued, not yet answered
    InFlight,
    /// Remote write succeeded; the next refresh supersedes the entry
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingEntry {
    /// Category the record is shown in
    pub category_id: CategoryId,
    /// Category the record was dragged out of
    pub origin: CategoryId,
    pub status: MoveStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingMoves {
    entries: HashMap<RecordId, PendingEntry>,
}

impl PendingMoves {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, record: &RecordId) -> Option<&PendingEntry> {
        self.entries.get(record)
    }

    /// Category a record should render in, if an entry overrides it
    pub fn effective_category(&self, record: &RecordId) -> Option<&CategoryId> {
        self.entries.get(record).map(|e| &e.category_id)
    }

    pub fn is_in_flight(&self, record: &RecordId) -> bool {
        matches!(
            self.entries.get(record),
            Some(PendingEntry {
                status: MoveStatus::InFlight,
                ..
            })
        )
    }

    /// Record an optimistic move. Replaces any confirmed entry.
    pub fn begin(&mut self, record: RecordId, origin: CategoryId, destination: CategoryId) {
        self.entries.insert(
            record,
            PendingEntry {
                category_id: destination,
                origin,
                status: MoveStatus::InFlight,
            },
        );
    }

    /// Mark an in-flight entry as confirmed. Returns false if there was none.
    pub fn confirm(&mut self, record: &RecordId) -> bool {
        match self.entries.get_mut(record) {
            Some(entry) if entry.status == MoveStatus::InFlight => {
                entry.status = MoveStatus::Confirmed;
                true
            }
            _ => false,
        }
    }

    /// Remove the entry for a record, returning it
    pub fn remove(&mut self, record: &RecordId) -> Option<PendingEntry> {
        self.entries.remove(record)
    }

    /// Drop confirmed entries after a full refresh; in-flight ones stay
    pub fn settle_confirmed(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.status == MoveStatus::InFlight);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &PendingEntry)> {
        self.entries.iter()
    }
}

/// Category edits applied locally whose remote writes have not finished.
///
/// Each edit is held under a ticket until its writes finish, and re-applied
/// to any category snapshot installed meanwhile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingCategoryEdits {
    next_ticket: u64,
    roles: Vec<(u64, RoleChange)>,
    order: Option<(u64, Vec<CategoryId>)>,
}

impl PendingCategoryEdits {
    pub fn new() -> Self {
        Self::default()
    }

    fn ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Hold a role change until [`PendingCategoryEdits::finish`]
    pub fn begin_role(&mut self, change: RoleChange) -> u64 {
        let ticket = self.ticket();
        self.roles.push((ticket, change));
        ticket
    }

    /// Hold a full column order. A later order replaces an earlier one.
    pub fn begin_order(&mut self, order: Vec<CategoryId>) -> u64 {
        let ticket = self.ticket();
        self.order = Some((ticket, order));
        ticket
    }

    /// Release the edit held under `ticket`. Returns false if it was gone.
    pub fn finish(&mut self, ticket: u64) -> bool {
        let before = self.roles.len();
        self.roles.retain(|(t, _)| *t != ticket);
        if self.roles.len() != before {
            return true;
        }
        match &self.order {
            Some((t, _)) if *t == ticket => {
                self.order = None;
                true
            }
            _ => false,
        }
    }

    pub fn role_changes(&self) -> impl Iterator<Item = &RoleChange> {
        self.roles.iter().map(|(_, change)| change)
    }

    pub fn column_order(&self) -> Option<&[CategoryId]> {
        self.order.as_ref().map(|(_, order)| order.as_slice())
    }

    pub fn len(&self) -> usize {
        self.roles.len() + usize::from(self.order.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.order.is_none()
    }

    /// Patch a category snapshot with every held edit, oldest role first
    pub fn apply_to(&self, store: &mut CategoryStore) {
        if let Some(order) = self.column_order() {
            store.arrange(order);
        }
        for change in self.role_changes() {
            roles::reapply(store, change);
        }
    }
}
