//! SetOrdering command

use crate::error::BoardError;
use crate::operation::{Execute, ExecutionResult, Operation};
use crate::session::BoardSession;
use crate::types::OrderingPolicy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Change how records are ordered inside each column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetOrdering {
    pub ordering: OrderingPolicy,
}

impl SetOrdering {
    pub fn new(ordering: OrderingPolicy) -> Self {
        Self { ordering }
    }
}

impl Operation for SetOrdering {
    fn verb(&self) -> &'static str {
        "set"
    }

    fn noun(&self) -> &'static str {
        "ordering"
    }

    fn description(&self) -> &'static str {
        "Set the in-column ordering policy"
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for SetOrdering {
    async fn execute(&self, session: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let started = Instant::now();
        let input = serde_json::to_value(self).unwrap_or(Value::Null);
        let previous = session.set_ordering(self.ordering);
        ExecutionResult::mutation(
            self.op_string(),
            input,
            Vec::new(),
            started,
            Ok(json!({ "previous": previous, "ordering": self.ordering })),
        )
    }
}
