//! Category types: Category, CategoryOrigin, Role

use super::ids::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Where a category was defined.
///
/// Set once when categories are fetched; the remote write shape for a
/// record move depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrigin {
    System,
    Custom,
}

/// Semantic tag a category can carry. Each role has at most one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Lead,
    CallBooked,
    Lost,
    Won,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Lead, Role::CallBooked, Role::Lost, Role::Won];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Lead => "lead",
            Role::CallBooked => "call_booked",
            Role::Lost => "lost",
            Role::Won => "won",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status column on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub display_name: String,
    /// 6-character hex color code without #
    pub color_token: String,
    pub origin: CategoryOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Dense ordering key across every category on the board
    pub column_order: usize,
}

impl Category {
    /// Create a category with an auto color based on its name
    pub fn new(
        id: impl Into<CategoryId>,
        display_name: impl Into<String>,
        origin: CategoryOrigin,
        column_order: usize,
    ) -> Self {
        let display_name = display_name.into();
        let color_token = crate::auto_color::auto_color(&display_name).to_string();
        Self {
            id: id.into(),
            display_name,
            color_token,
            origin,
            role: None,
            column_order,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color_token = color.into();
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn is_system(&self) -> bool {
        self.origin == CategoryOrigin::System
    }
}

/// A category as the remote store returns it, before origin and role are
/// attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedCategory {
    pub id: CategoryId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_token: Option<String>,
    pub column_order: usize,
}

impl FetchedCategory {
    pub fn new(id: impl Into<CategoryId>, display_name: impl Into<String>, order: usize) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            color_token: None,
            column_order: order,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color_token = Some(color.into());
        self
    }
}

/// Result of `fetchCategories`: both partitions plus the role mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFetch {
    #[serde(default)]
    pub system: Vec<FetchedCategory>,
    #[serde(default)]
    pub custom: Vec<FetchedCategory>,
    #[serde(default)]
    pub roles: HashMap<Role, Option<CategoryId>>,
}
