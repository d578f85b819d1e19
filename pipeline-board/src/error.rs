//! Error types for the pipeline board

use crate::config::ConfigError;
use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Failures reported by a [`RemoteStore`](crate::store::RemoteStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Network failure, timeout, or the store is down
    #[error("remote store unavailable: {message}")]
    Unavailable { message: String },

    /// The referenced record or category no longer exists remotely
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// The store refused the write (validation, permissions)
    #[error("write rejected: {message}")]
    Rejected { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Broad classes of board failures.
///
/// None of these is fatal to the host: the worst case is a record
/// visually returning to the column it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A remote write failed; recovered by rollback or refetch
    TransientWrite,
    /// A drag or command referenced a record or category that is gone
    StaleReference,
    /// Remote data broke a board invariant (double role, etc.)
    InvariantViolation,
    /// The caller asked for something the board refuses to do
    Usage,
    /// Configuration could not be loaded
    Config,
}

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// Remote collaborator failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Record not present in the current snapshot
    #[error("record not found: {id}")]
    RecordNotFound { id: String },

    /// Category not present in the category store
    #[error("category not found: {id}")]
    CategoryNotFound { id: String },

    /// A move named a source column the record is not shown in
    #[error("record {id} is not in category {category}")]
    StaleSource { id: String, category: String },

    /// A previous move of the same record has not resolved yet
    #[error("move already in progress for record {id}")]
    MoveInProgress { id: String },

    /// Column index outside the board
    #[error("column index {index} out of range for {len} columns")]
    InvalidColumnIndex { index: usize, len: usize },

    /// Remote data violates a board invariant
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// Create an invariant violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a category-not-found error
    pub fn category_not_found(id: impl ToString) -> Self {
        Self::CategoryNotFound { id: id.to_string() }
    }

    /// Create a record-not-found error
    pub fn record_not_found(id: impl ToString) -> Self {
        Self::RecordNotFound { id: id.to_string() }
    }

    /// Create a stale-source error
    pub fn stale_source(id: impl ToString, category: impl ToString) -> Self {
        Self::StaleSource {
            id: id.to_string(),
            category: category.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(StoreError::NotFound { .. }) => ErrorKind::StaleReference,
            Self::Store(_) => ErrorKind::TransientWrite,
            Self::RecordNotFound { .. }
            | Self::CategoryNotFound { .. }
            | Self::StaleSource { .. } => ErrorKind::StaleReference,
            Self::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            Self::MoveInProgress { .. } | Self::InvalidColumnIndex { .. } => ErrorKind::Usage,
            Self::Config(_) => ErrorKind::Config,
            Self::Json(_) => ErrorKind::Usage,
        }
    }

    /// Check if repeating the gesture can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TransientWrite | ErrorKind::StaleReference
        ) || matches!(self, Self::MoveInProgress { .. })
    }
}
