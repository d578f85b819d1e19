//! Remote store seam
//!
//! The board never talks to the network itself. Everything it reads or writes
//! goes through a [`RemoteStore`] supplied by the host.

use crate::error::StoreError;
use crate::types::{CategoryFetch, CategoryId, CategoryOrigin, Record, RecordFilter, RecordId, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for remote store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Payload of a record category assignment.
///
/// System and custom statuses are stored differently remotely, so the write
/// carries the origin of the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCategoryWrite {
    pub category_id: CategoryId,
    pub origin_hint: CategoryOrigin,
}

/// Authoritative storage for categories and records
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Both category partitions plus the role mapping
    async fn fetch_categories(&self) -> StoreResult<CategoryFetch>;

    async fn fetch_records(&self, filter: &RecordFilter) -> StoreResult<Vec<Record>>;

    async fn write_record_category(
        &self,
        record_id: &RecordId,
        write: &RecordCategoryWrite,
    ) -> StoreResult<()>;

    async fn write_column_order(&self, category_id: &CategoryId, new_index: usize)
        -> StoreResult<()>;

    /// `None` clears the category's role
    async fn write_category_role(
        &self,
        category_id: &CategoryId,
        role: Option<Role>,
    ) -> StoreResult<()>;
}
