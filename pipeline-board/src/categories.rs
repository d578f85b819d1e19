//! Category store: the ordered set of status columns
//!
//! Categories are kept sorted by `column_order`. The store owns two
//! invariants: ids are unique, and each [`Role`] is held by at most one
//! category.

use crate::error::{BoardError, Result};
use crate::types::{Category, CategoryFetch, CategoryId, CategoryOrigin, FetchedCategory, Role};
use std::collections::{HashMap, HashSet};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStore {
    columns: Vec<Category>,
}

impl CategoryStore {
    /// Build a store from fully formed categories.
    ///
    /// Fails with [`BoardError::InvariantViolation`] on duplicate ids or a
    /// role claimed twice.
    pub fn new(mut categories: Vec<Category>) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut roles = HashSet::new();
        for category in &categories {
            if !ids.insert(category.id.clone()) {
                return Err(BoardError::invariant(format!(
                    "duplicate category id {}",
                    category.id
                )));
            }
            if let Some(role) = category.role {
                if !roles.insert(role) {
                    return Err(BoardError::invariant(format!(
                        "role {} is held by more than one category",
                        role
                    )));
                }
            }
        }

        // Stable: ties keep fetch order (system partition first)
        categories.sort_by_key(|c| c.column_order);
        if categories
            .windows(2)
            .any(|w| w[0].column_order == w[1].column_order)
        {
            warn!("remote categories share a column_order; keeping fetch order for ties");
        }

        Ok(Self {
            columns: categories,
        })
    }

    /// Build a store from a `fetchCategories` response, tagging each category
    /// with the partition it came from and attaching roles.
    pub fn from_fetch(fetch: CategoryFetch) -> Result<Self> {
        fn build(fetched: FetchedCategory, origin: CategoryOrigin) -> Category {
            let category = Category::new(
                fetched.id,
                fetched.display_name,
                origin,
                fetched.column_order,
            );
            match fetched.color_token {
                Some(color) => category.with_color(color),
                None => category,
            }
        }

        let mut categories: Vec<Category> = fetch
            .system
            .into_iter()
            .map(|c| build(c, CategoryOrigin::System))
            .chain(
                fetch
                    .custom
                    .into_iter()
                    .map(|c| build(c, CategoryOrigin::Custom)),
            )
            .collect();

        let mut roles: Vec<(Role, CategoryId)> = fetch
            .roles
            .into_iter()
            .filter_map(|(role, id)| id.map(|id| (role, id)))
            .collect();
        roles.sort();

        for (role, id) in roles {
            let Some(category) = categories.iter_mut().find(|c| c.id == id) else {
                warn!(%role, category = %id, "role points at an unknown category; ignoring");
                continue;
            };
            if let Some(existing) = category.role {
                return Err(BoardError::invariant(format!(
                    "category {} holds both {} and {}",
                    id, existing, role
                )));
            }
            category.role = Some(role);
        }

        Self::new(categories)
    }

    /// Categories in column order
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.columns.iter()
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.columns.iter().find(|c| &c.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &CategoryId) -> Option<&mut Category> {
        self.columns.iter_mut().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.get(id).is_some()
    }

    /// Position of a category in the rendered column order
    pub fn index_of(&self, id: &CategoryId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    pub fn system(&self) -> impl Iterator<Item = &Category> {
        self.columns
            .iter()
            .filter(|c| c.origin == CategoryOrigin::System)
    }

    pub fn custom(&self) -> impl Iterator<Item = &Category> {
        self.columns
            .iter()
            .filter(|c| c.origin == CategoryOrigin::Custom)
    }

    pub fn origin_of(&self, id: &CategoryId) -> Option<CategoryOrigin> {
        self.get(id).map(|c| c.origin)
    }

    /// The category currently holding `role`, if any
    pub fn role_holder(&self, role: Role) -> Option<&Category> {
        self.columns.iter().find(|c| c.role == Some(role))
    }

    /// Current role mapping, one entry per held role
    pub fn roles(&self) -> HashMap<Role, CategoryId> {
        self.columns
            .iter()
            .filter_map(|c| c.role.map(|role| (role, c.id.clone())))
            .collect()
    }

    /// Put the listed categories first, in that order, and renumber every
    /// `column_order` densely. Unlisted categories keep their relative order
    /// after the listed ones.
    pub fn arrange(&mut self, order: &[CategoryId]) {
        self.columns.sort_by_key(|c| {
            order
                .iter()
                .position(|id| id == &c.id)
                .unwrap_or(order.len())
        });
        for (index, category) in self.columns.iter_mut().enumerate() {
            category.column_order = index;
        }
    }

    /// Move the column at `from` to index `to`, shifting the columns in
    /// between by one. Every category's `column_order` is rewritten to its
    /// new dense index.
    ///
    /// Returns the categories whose order changed, as `(id, new_index)` in
    /// column order.
    pub fn move_column(&mut self, from: usize, to: usize) -> Result<Vec<(CategoryId, usize)>> {
        let len = self.columns.len();
        for index in [from, to] {
            if index >= len {
                return Err(BoardError::InvalidColumnIndex { index, len });
            }
        }

        if from != to {
            let moved = self.columns.remove(from);
            self.columns.insert(to, moved);
        }

        let mut changed = Vec::new();
        for (index, category) in self.columns.iter_mut().enumerate() {
            if category.column_order != index {
                category.column_order = index;
                changed.push((category.id.clone(), index));
            }
        }
        Ok(changed)
    }
}
