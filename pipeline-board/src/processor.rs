//! Board command processor

use crate::activity::ActivityEntry;
use crate::error::BoardError;
use crate::operation::{Execute, OperationProcessor};
use crate::session::BoardSession;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Runs board commands and appends what they log to the session's activity
/// log, stamped with the acting user if one is set.
#[derive(Debug, Clone, Default)]
pub struct BoardOperationProcessor {
    actor: Option<String>,
}

impl BoardOperationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
        }
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }
}

#[async_trait]
impl OperationProcessor<BoardSession, BoardError> for BoardOperationProcessor {
    async fn process<T>(&self, operation: &T, session: &BoardSession) -> Result<Value, BoardError>
    where
        T: Execute<BoardSession, BoardError> + Send + Sync,
    {
        debug!(op = %operation.op_string(), "processing");
        let (result, entry) = operation.execute(session).await.split();

        if let Some(entry) = entry {
            self.write_log(session, entry).await?;
        }
        result
    }

    async fn write_log(
        &self,
        session: &BoardSession,
        entry: ActivityEntry,
    ) -> Result<(), BoardError> {
        let entry = match &self.actor {
            Some(actor) => entry.with_actor(actor.clone()),
            None => entry,
        };
        session.record_activity(entry);
        Ok(())
    }
}
