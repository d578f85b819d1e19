//! Command traits
//!
//! Commands are structs whose fields are their parameters. They describe
//! themselves through [`Operation`] and run against a context through
//! [`Execute`], reporting whether the run should be recorded in the
//! activity log.

use crate::activity::ActivityEntry;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Display;
use std::time::Instant;

/// Static description of a command
pub trait Operation {
    fn verb(&self) -> &'static str;

    fn noun(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Canonical "verb noun" string used in the activity log
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Outcome of running a command
#[derive(Debug)]
pub enum ExecutionResult<T, E> {
    /// Succeeded and mutated state
    Logged { value: T, entry: ActivityEntry },
    /// Succeeded without side effects
    Unlogged { value: T },
    /// Failed; mutating commands still leave an entry
    Failed {
        error: E,
        entry: Option<ActivityEntry>,
    },
}

impl<T, E> ExecutionResult<T, E> {
    pub fn into_result(self) -> Result<T, E> {
        self.split().0
    }

    pub fn split(self) -> (Result<T, E>, Option<ActivityEntry>) {
        match self {
            Self::Logged { value, entry } => (Ok(value), Some(entry)),
            Self::Unlogged { value } => (Ok(value), None),
            Self::Failed { error, entry } => (Err(error), entry),
        }
    }

    pub fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Logged { .. } | Self::Failed { entry: Some(_), .. }
        )
    }
}

impl<E: Display> ExecutionResult<Value, E> {
    /// Wrap the result of a mutating command, timing it from `started`
    pub fn mutation(
        op: impl Into<String>,
        input: Value,
        affected: Vec<String>,
        started: Instant,
        result: Result<Value, E>,
    ) -> Self {
        let duration_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(value) => Self::Logged {
                entry: ActivityEntry::new(op, input, value.clone(), duration_ms)
                    .with_affected(affected),
                value,
            },
            Err(error) => Self::Failed {
                entry: Some(
                    ActivityEntry::failure(op, input, &error.to_string(), duration_ms)
                        .with_affected(affected),
                ),
                error,
            },
        }
    }

    /// Wrap the result of a read-only command
    pub fn query(result: Result<Value, E>) -> Self {
        match result {
            Ok(value) => Self::Unlogged { value },
            Err(error) => Self::Failed { error, entry: None },
        }
    }
}

/// Run a command against a context
#[async_trait]
pub trait Execute<C, E>: Operation + Send + Sync
where
    C: Send + Sync,
{
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;
}

/// Runs commands and persists what they log
#[async_trait]
pub trait OperationProcessor<C, E>: Send + Sync
where
    C: Send + Sync,
{
    async fn process<T>(&self, operation: &T, ctx: &C) -> Result<Value, E>
    where
        T: Execute<C, E> + Send + Sync;

    async fn write_log(&self, ctx: &C, entry: ActivityEntry) -> Result<(), E>;
}
