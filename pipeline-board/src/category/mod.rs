//! Category commands

mod assign_role;

pub use assign_role::AssignRole;
