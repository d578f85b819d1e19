//! Record types: Record, ValueMetrics, RecordFilter

use super::ids::{CategoryId, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deal value of a contact, split by stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueMetrics {
    #[serde(default)]
    pub pending_value: f64,
    #[serde(default)]
    pub confirmed_value: f64,
    #[serde(default)]
    pub active_value: f64,
}

impl ValueMetrics {
    pub fn new(pending_value: f64, confirmed_value: f64, active_value: f64) -> Self {
        Self {
            pending_value,
            confirmed_value,
            active_value,
        }
    }

    /// Sum of all three values. Always computed, never cached.
    pub fn total(&self) -> f64 {
        self.pending_value + self.confirmed_value + self.active_value
    }
}

/// A contact card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub display_name: String,
    /// Records without a category are not shown on the board
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Server-assigned in-column order
    #[serde(default)]
    pub position_key: f64,
    #[serde(default)]
    pub value_metrics: ValueMetrics,
    #[serde(default)]
    pub next_event_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn new(
        id: impl Into<RecordId>,
        category: impl Into<CategoryId>,
        position_key: f64,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            category_id: Some(category.into()),
            position_key,
            value_metrics: ValueMetrics::default(),
            next_event_at: None,
        }
    }

    /// A record that is not assigned to any column
    pub fn uncategorized(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            category_id: None,
            position_key: 0.0,
            value_metrics: ValueMetrics::default(),
            next_event_at: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_values(mut self, values: ValueMetrics) -> Self {
        self.value_metrics = values;
        self
    }

    pub fn with_next_event(mut self, at: DateTime<Utc>) -> Self {
        self.next_event_at = Some(at);
        self
    }

    pub fn total_value(&self) -> f64 {
        self.value_metrics.total()
    }
}

/// Filter passed through to `fetchRecords`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive substring match on the display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl RecordFilter {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `record` passes this filter
    pub fn matches(&self, record: &Record) -> bool {
        match &self.search {
            Some(needle) => record
                .display_name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
