//! Core types for the pipeline board

mod category;
mod ids;
mod ordering;
mod record;

// Re-export all types
pub use category::{Category, CategoryFetch, CategoryOrigin, FetchedCategory, Role};
pub use ids::{CategoryId, RecordId};
pub use ordering::OrderingPolicy;
pub use record::{Record, RecordFilter, ValueMetrics};
