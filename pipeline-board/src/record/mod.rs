//! Record commands

mod mv;

pub use mv::MoveRecord;
