//! AssignRole command

use crate::error::{BoardError, Result};
use crate::operation::{Execute, ExecutionResult, Operation};
use crate::session::BoardSession;
use crate::types::{CategoryId, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Give a status role to a category, or clear it with `role: null`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRole {
    /// Category receiving the role
    pub id: CategoryId,
    pub role: Option<Role>,
}

impl AssignRole {
    pub fn new(id: impl Into<CategoryId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role: Some(role),
        }
    }

    pub fn clear(id: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            role: None,
        }
    }

    async fn run(&self, session: &BoardSession) -> Result<Value> {
        let change = session.assign_role(&self.id, self.role).await?;
        Ok(serde_json::to_value(change)?)
    }
}

impl Operation for AssignRole {
    fn verb(&self) -> &'static str {
        "assign"
    }

    fn noun(&self) -> &'static str {
        "role"
    }

    fn description(&self) -> &'static str {
        "Assign a status role to a category, taking it from its current holder"
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for AssignRole {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let started = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        let result = self.run(session).await;
        ExecutionResult::mutation(
            self.op_string(),
            input,
            vec![self.id.to_string()],
            started,
            result,
        )
    }
}
