//! RefreshBoard command

use crate::error::{BoardError, Result};
use crate::operation::{Execute, ExecutionResult, Operation};
use crate::session::BoardSession;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

fn yes() -> bool {
    true
}

/// Re-read categories and/or records from the remote store.
///
/// Optimistic moves whose writes are still in flight survive the refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshBoard {
    #[serde(default = "yes")]
    pub categories: bool,
    #[serde(default = "yes")]
    pub records: bool,
}

impl Default for RefreshBoard {
    fn default() -> Self {
        Self {
            categories: true,
            records: true,
        }
    }
}

impl RefreshBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_only() -> Self {
        Self {
            categories: false,
            records: true,
        }
    }

    pub fn categories_only() -> Self {
        Self {
            categories: true,
            records: false,
        }
    }

    async fn run(&self, session: &BoardSession) -> Result<Value> {
        let categories = if self.categories {
            Some(session.refresh_categories().await?)
        } else {
            None
        };
        let records = if self.records {
            Some(session.refresh_records().await?)
        } else {
            None
        };
        Ok(json!({
            "categories": categories,
            "records": records,
            "pending": session.pending_moves().len(),
        }))
    }
}

impl Operation for RefreshBoard {
    fn verb(&self) -> &'static str {
        "refresh"
    }

    fn noun(&self) -> &'static str {
        "board"
    }

    fn description(&self) -> &'static str {
        "Reload categories and records from the remote store"
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for RefreshBoard {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let started = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        let result = self.run(session).await;
        ExecutionResult::mutation(self.op_string(), input, Vec::new(), started, result)
    }
}
