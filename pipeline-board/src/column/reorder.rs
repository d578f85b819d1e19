//! ReorderColumn command

use crate::error::{BoardError, Result};
use crate::operation::{Execute, ExecutionResult, Operation};
use crate::session::BoardSession;
use crate::types::CategoryId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Move a column to a new index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderColumn {
    /// Category whose column moves
    pub id: CategoryId,
    /// Destination index in column order
    pub index: usize,
}

impl ReorderColumn {
    pub fn new(id: impl Into<CategoryId>, index: usize) -> Self {
        Self {
            id: id.into(),
            index,
        }
    }

    async fn run(&self, session: &BoardSession) -> Result<Value> {
        let reorder = session.move_column(&self.id, self.index).await?;
        let order: Vec<CategoryId> = session.categories().iter().map(|c| c.id.clone()).collect();
        Ok(json!({
            "reordered": reorder.is_some(),
            "changed": reorder.map(|r| r.changed).unwrap_or_default(),
            "order": order,
        }))
    }
}

impl Operation for ReorderColumn {
    fn verb(&self) -> &'static str {
        "reorder"
    }

    fn noun(&self) -> &'static str {
        "column"
    }

    fn description(&self) -> &'static str {
        "Move a column to a new position on the board"
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for ReorderColumn {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::memory::StoreWrite;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reorder_column() {
        let store = Arc::new(fixtures::store());
        let (session, _) = fixtures::session(store.clone()).await;

        let result = ReorderColumn::new("won", 0)
            .execute(&session)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["reordered"], true);
        assert_eq!(result["order"], json!(["won", "lead", "active"]));
        assert_eq!(
            store.journal(),
            vec![
                StoreWrite::ColumnOrder {
                    category_id: "won".into(),
                    index: 0
                },
                StoreWrite::ColumnOrder {
                    category_id: "lead".into(),
                    index: 1
                },
                StoreWrite::ColumnOrder {
                    category_id: "active".into(),
                    index: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_reorder_to_same_index() {
        let store = Arc::new(fixtures::store());
        let (session, _) = fixtures::session(store.clone()).await;

        let result = ReorderColumn::new("active", 1)
            .execute(&session)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["reordered"], false);
        assert!(store.journal().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_out_of_range() {
        let store = Arc::new(fixtures::store());
        let (session, notifier) = fixtures::session(store).await;

        let err = ReorderColumn::new("lead", 7)
            .execute(&session)
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidColumnIndex { index: 7, len: 3 }));
        assert_eq!(notifier.errors().len(), 1);
    }
}
