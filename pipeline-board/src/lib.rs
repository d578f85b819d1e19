//! Pipeline board engine
//!
//! Contacts ("records") are grouped into status columns ("categories") and
//! moved between them by drag and drop. Moves are applied optimistically and
//! rolled back exactly if the remote write fails. Columns can be reordered,
//! and each status role (lead, call booked, lost, won) is owned by at most one
//! category at a time.
//!
//! ## Overview
//!
//! - **Host-owned storage** - The board reads and writes through a
//!   [`RemoteStore`]; it never performs I/O itself
//! - **Derived view** - [`BoardView`] is recomputed from categories, records
//!   and the session's view state on every render
//! - **Session scoped** - Optimistic moves and drag state live in one
//!   [`BoardSession`] and are discarded with it
//! - **Commands** - Every mutation is also a command struct that can run
//!   through [`BoardOperationProcessor`] into the session's activity log
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use pipeline_board::{BoardSession, InMemoryStore, record::MoveRecord, Execute};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new());
//! let session = BoardSession::builder(store).open().await?;
//!
//! // Drag a card from one column to another
//! session
//!     .move_record(&"contact-1".into(), &"lead".into(), &"won".into())
//!     .await?;
//!
//! // Or as a command
//! let result = MoveRecord::new("contact-2", "won")
//!     .execute(&session)
//!     .await
//!     .into_result()?;
//! println!("moved: {}", result["moved"]);
//!
//! for column in session.render().columns.values() {
//!     println!("{}: {} ({})", column.category.display_name, column.count, column.total_value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod activity;
pub mod auto_color;
pub mod categories;
pub mod config;
pub mod drag;
mod error;
pub mod grouper;
pub mod memory;
pub mod notify;
pub mod operation;
pub mod pending;
mod processor;
pub mod roles;
mod session;
pub mod store;
pub mod types;

// Command modules
pub mod board;
pub mod category;
pub mod column;
pub mod record;

#[cfg(test)]
mod fixtures;

pub use async_trait::async_trait;
pub use operation::{Execute, ExecutionResult, Operation, OperationProcessor};

pub use activity::{ActivityEntry, ActivityLog};
pub use categories::CategoryStore;
pub use config::{BoardConfig, ConfigError, Messages};
pub use error::{BoardError, ErrorKind, Result, StoreError};
pub use grouper::{render_board, BoardView, ColumnView};
pub use memory::{InMemoryStore, StoreWrite};
pub use notify::{
    BoardObserver, LogNotifier, NoopObserver, Notification, NotificationLevel, Notifier,
    RecordingNotifier,
};
pub use pending::{MoveStatus, PendingCategoryEdits, PendingEntry, PendingMoves};
pub use processor::BoardOperationProcessor;
pub use session::{
    BoardSession, BoardSessionBuilder, BoardViewState, ColumnReorder, MoveSummary, PendingMove,
};
pub use store::{RecordCategoryWrite, RemoteStore, StoreResult};

// Re-export commonly used types
pub use types::{
    Category, CategoryFetch, CategoryId, CategoryOrigin, FetchedCategory, OrderingPolicy, Record,
    RecordFilter, RecordId, Role, ValueMetrics,
};
