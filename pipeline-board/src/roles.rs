//! Status role assignment
//!
//! A role change is planned against the current store, applied locally as one
//! step (old holder cleared and new holder set together), and then written
//! remotely as up to two field writes.

use crate::categories::CategoryStore;
use crate::error::{BoardError, Result};
use crate::types::{CategoryId, Role};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleChange {
    pub category: CategoryId,
    /// Requested role; `None` clears the category's role
    pub role: Option<Role>,
    /// Role the category held before
    pub previous: Option<Role>,
    /// Category that held `role` and loses it
    pub displaced: Option<CategoryId>,
}

impl RoleChange {
    /// Nothing would change locally or remotely
    pub fn is_noop(&self) -> bool {
        self.displaced.is_none() && self.previous == self.role
    }

    /// Remote writes in issue order: the displaced holder is cleared first.
    pub fn writes(&self) -> Vec<(CategoryId, Option<Role>)> {
        if self.is_noop() {
            return Vec::new();
        }
        self.displaced
            .iter()
            .map(|id| (id.clone(), None))
            .chain(std::iter::once((self.category.clone(), self.role)))
            .collect()
    }
}

/// Work out what assigning `role` to `category` touches
pub fn plan(
    store: &CategoryStore,
    category: &CategoryId,
    role: Option<Role>,
) -> Result<RoleChange> {
    let target = store
        .get(category)
        .ok_or_else(|| BoardError::category_not_found(category))?;

    let displaced = role
        .and_then(|r| store.role_holder(r))
        .filter(|holder| &holder.id != category)
        .map(|holder| holder.id.clone());

    Ok(RoleChange {
        category: category.clone(),
        role,
        previous: target.role,
        displaced,
    })
}

/// Apply a planned change to the local store in one step
pub fn apply(store: &mut CategoryStore, change: &RoleChange) -> Result<()> {
    if !store.contains(&change.category) {
        return Err(BoardError::category_not_found(&change.category));
    }
    if let Some(displaced) = &change.displaced {
        if let Some(holder) = store.get_mut(displaced) {
            holder.role = None;
        }
    }
    if let Some(target) = store.get_mut(&change.category) {
        target.role = change.role;
    }
    Ok(())
}

/// Force a change onto a store that may already reflect some or none of it.
///
/// Returns false when the target category is no longer in the store.
pub fn reapply(store: &mut CategoryStore, change: &RoleChange) -> bool {
    if !store.contains(&change.category) {
        return false;
    }
    if let Some(role) = change.role {
        let holder = store
            .role_holder(role)
            .map(|c| c.id.clone())
            .filter(|id| id != &change.category);
        if let Some(holder) = holder.and_then(|id| store.get_mut(&id)) {
            holder.role = None;
        }
    }
    if let Some(target) = store.get_mut(&change.category) {
        target.role = change.role;
    }
    true
}
