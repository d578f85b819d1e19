//! In-memory [`RemoteStore`]
//!
//! Holds categories, records and the role mapping in process. Every accepted
//! write is appended to a journal, and writes can be made to fail on demand,
//! which is what the board's rollback and refetch paths are tested against.

use crate::error::StoreError;
use crate::store::{RecordCategoryWrite, RemoteStore, StoreResult};
use crate::types::{
    CategoryFetch, CategoryId, CategoryOrigin, FetchedCategory, Record, RecordFilter, RecordId,
    Role,
};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// A write the store accepted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreWrite {
    RecordCategory {
        record_id: RecordId,
        category_id: CategoryId,
        origin_hint: CategoryOrigin,
    },
    ColumnOrder {
        category_id: CategoryId,
        index: usize,
    },
    CategoryRole {
        category_id: CategoryId,
        role: Option<Role>,
    },
}

#[derive(Debug, Default, Clone, Copy)]
struct FailurePlan {
    /// Writes to let through before failing
    skip: usize,
    /// Writes to fail after that
    count: usize,
}

#[derive(Debug, Default)]
struct MemoryData {
    system: Vec<FetchedCategory>,
    custom: Vec<FetchedCategory>,
    roles: HashMap<Role, Option<CategoryId>>,
    records: Vec<Record>,
    journal: Vec<StoreWrite>,
    failures: FailurePlan,
    failed_writes: usize,
}

impl MemoryData {
    fn origin_of(&self, id: &CategoryId) -> Option<CategoryOrigin> {
        if self.system.iter().any(|c| &c.id == id) {
            Some(CategoryOrigin::System)
        } else if self.custom.iter().any(|c| &c.id == id) {
            Some(CategoryOrigin::Custom)
        } else {
            None
        }
    }

    fn category_mut(&mut self, id: &CategoryId) -> Option<&mut FetchedCategory> {
        self.system
            .iter_mut()
            .chain(self.custom.iter_mut())
            .find(|c| &c.id == id)
    }

    /// Consume one slot of the failure plan
    fn check_failure(&mut self) -> StoreResult<()> {
        if self.failures.skip > 0 {
            self.failures.skip -= 1;
            return Ok(());
        }
        if self.failures.count > 0 {
            self.failures.count -= 1;
            self.failed_writes += 1;
            return Err(StoreError::unavailable("injected write failure"));
        }
        Ok(())
    }
}

/// Process-local store, mainly for tests and demos
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Mutex<MemoryData>,
    latency: Option<Duration>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_category(self, category: FetchedCategory) -> Self {
        self.data().system.push(category);
        self
    }

    pub fn with_custom_category(self, category: FetchedCategory) -> Self {
        self.data().custom.push(category);
        self
    }

    pub fn with_role(self, role: Role, category: impl Into<CategoryId>) -> Self {
        self.data().roles.insert(role, Some(category.into()));
        self
    }

    pub fn with_record(self, record: Record) -> Self {
        self.data().records.push(record);
        self
    }

    pub fn with_records(self, records: impl IntoIterator<Item = Record>) -> Self {
        self.data().records.extend(records);
        self
    }

    /// Delay every call, so tests can interleave with in-flight writes
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn data(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Fail the next `count` writes
    pub fn fail_next_writes(&self, count: usize) {
        self.fail_writes_after(0, count);
    }

    /// Let `skip` writes through, then fail the following `count`
    pub fn fail_writes_after(&self, skip: usize, count: usize) {
        self.data().failures = FailurePlan { skip, count };
    }

    /// Accepted writes, oldest first
    pub fn journal(&self) -> Vec<StoreWrite> {
        self.data().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.data().journal.clear();
    }

    /// Number of writes rejected by injected failures
    pub fn failed_writes(&self) -> usize {
        self.data().failed_writes
    }

    pub fn record(&self, id: &RecordId) -> Option<Record> {
        self.data().records.iter().find(|r| &r.id == id).cloned()
    }

    /// Overwrite a record server-side, as another client would
    pub fn put_record(&self, record: Record) {
        let mut data = self.data();
        match data.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => data.records.push(record),
        }
    }

    /// Delete a category server-side, along with any role it held
    pub fn remove_category(&self, id: &CategoryId) {
        let mut data = self.data();
        data.system.retain(|c| &c.id != id);
        data.custom.retain(|c| &c.id != id);
        for holder in data.roles.values_mut() {
            if holder.as_ref() == Some(id) {
                *holder = None;
            }
        }
    }

    /// Role mapping as stored
    pub fn role_holder(&self, role: Role) -> Option<CategoryId> {
        self.data().roles.get(&role).cloned().flatten()
    }

    pub fn column_order(&self, id: &CategoryId) -> Option<usize> {
        let data = self.data();
        data.system
            .iter()
            .chain(data.custom.iter())
            .find(|c| &c.id == id)
            .map(|c| c.column_order)
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn fetch_categories(&self) -> StoreResult<CategoryFetch> {
        self.delay().await;
        let data = self.data();
        Ok(CategoryFetch {
            system: data.system.clone(),
            custom: data.custom.clone(),
            roles: data.roles.clone(),
        })
    }

    async fn fetch_records(&self, filter: &RecordFilter) -> StoreResult<Vec<Record>> {
        self.delay().await;
        let data = self.data();
        let matching = data.records.iter().filter(|r| filter.matches(r)).cloned();
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn write_record_category(
        &self,
        record_id: &RecordId,
        write: &RecordCategoryWrite,
    ) -> StoreResult<()> {
        self.delay().await;
        let mut data = self.data();
        data.check_failure()?;

        let origin = data
            .origin_of(&write.category_id)
            .ok_or_else(|| StoreError::not_found("category", write.category_id.as_str()))?;
        if origin != write.origin_hint {
            return Err(StoreError::rejected(format!(
                "category {} is {:?}, write claimed {:?}",
                write.category_id, origin, write.origin_hint
            )));
        }

        let position_key = data
            .records
            .iter()
            .filter(|r| r.category_id.as_ref() == Some(&write.category_id))
            .map(|r| r.position_key)
            .fold(None, |max: Option<f64>, p| Some(max.map_or(p, |m| m.max(p))))
            .map_or(0.0, |max| max + 1.0);

        let record = data
            .records
            .iter_mut()
            .find(|r| &r.id == record_id)
            .ok_or_else(|| StoreError::not_found("record", record_id.as_str()))?;
        record.category_id = Some(write.category_id.clone());
        record.position_key = position_key;

        debug!(
            record = %record_id,
            category = %write.category_id,
            position_key,
            "record category written"
        );
        data.journal.push(StoreWrite::RecordCategory {
            record_id: record_id.clone(),
            category_id: write.category_id.clone(),
            origin_hint: write.origin_hint,
        });
        Ok(())
    }

    async fn write_column_order(
        &self,
        category_id: &CategoryId,
        new_index: usize,
    ) -> StoreResult<()> {
        self.delay().await;
        let mut data = self.data();
        data.check_failure()?;

        let category = data
            .category_mut(category_id)
            .ok_or_else(|| StoreError::not_found("category", category_id.as_str()))?;
        category.column_order = new_index;

        data.journal.push(StoreWrite::ColumnOrder {
            category_id: category_id.clone(),
            index: new_index,
        });
        Ok(())
    }

    async fn write_category_role(
        &self,
        category_id: &CategoryId,
        role: Option<Role>,
    ) -> StoreResult<()> {
        self.delay().await;
        let mut data = self.data();
        data.check_failure()?;

        if data.origin_of(category_id).is_none() {
            return Err(StoreError::not_found("category", category_id.as_str()));
        }
        for holder in data.roles.values_mut() {
            if holder.as_ref() == Some(category_id) {
                *holder = None;
            }
        }
        if let Some(role) = role {
            data.roles.insert(role, Some(category_id.clone()));
        }

        data.journal.push(StoreWrite::CategoryRole {
            category_id: category_id.clone(),
            role,
        });
        Ok(())
    }
}
