//! RenderBoard command

use crate::error::BoardError;
use crate::operation::{Execute, ExecutionResult, Operation};
use crate::session::BoardSession;
use crate::types::OrderingPolicy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Produce the per-column view model. Read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderBoard {
    /// Render under this policy instead of the session's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<OrderingPolicy>,
}

impl RenderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = Some(ordering);
        self
    }
}

impl Operation for RenderBoard {
    fn verb(&self) -> &'static str {
        "render"
    }

    fn noun(&self) -> &'static str {
        "board"
    }

    fn description(&self) -> &'static str {
        "Group records into columns and order them"
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for RenderBoard {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let view = match self.ordering {
            Some(policy) => session.render_with(policy),
            None => session.render(),
        };
        ExecutionResult::query(serde_json::to_value(view).map_err(BoardError::from))
    }
}
