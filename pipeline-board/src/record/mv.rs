//! MoveRecord command

use crate::error::{BoardError, Result};
use crate::operation::{Execute, ExecutionResult, Operation};
use crate::session::BoardSession;
use crate::types::{CategoryId, RecordId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Move a record to a different category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The record to move
    pub id: RecordId,
    /// Destination category
    pub to: CategoryId,
    /// Source category; defaults to the column the record renders in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<CategoryId>,
}

impl MoveRecord {
    pub fn new(id: impl Into<RecordId>, to: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            to: to.into(),
            from: None,
        }
    }

    pub fn from_category(mut self, from: impl Into<CategoryId>) -> Self {
        self.from = Some(from.into());
        self
    }

    async fn run(&self, session: &BoardSession) -> Result<Value> {
        let moved = match &self.from {
            Some(from) => session.move_record(&self.id, from, &self.to).await?,
            None => session.move_record_to(&self.id, &self.to).await?,
        };
        Ok(match moved {
            Some(summary) => json!({ "moved": true, "move": summary }),
            None => json!({ "moved": false, "record_id": self.id }),
        })
    }
}

impl Operation for MoveRecord {
    fn verb(&self) -> &'static str {
        "move"
    }

    fn noun(&self) -> &'static str {
        "record"
    }

    fn description(&self) -> &'static str {
        "Move a record to a different category"
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for MoveRecord {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let started = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        let result = self.run(session).await;
        ExecutionResult::mutation(
            self.op_string(),
            input,
            vec![self.id.to_string(), self.to.to_string()],
            started,
            result,
        )
    }
}
