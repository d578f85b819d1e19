//! Board-level commands

mod ordering;
mod refresh;
mod render;

pub use ordering::SetOrdering;
pub use refresh::RefreshBoard;
pub use render::RenderBoard;
