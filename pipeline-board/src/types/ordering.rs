//! In-column ordering policies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How records are ordered inside a column. Exactly one is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Ascending by server position key
    #[default]
    Manual,
    /// Highest total value first
    ValueDesc,
    /// Lowest total value first
    ValueAsc,
    /// Soonest next event first; records without one go last
    NextEventAsc,
}

impl OrderingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::ValueDesc => "value_desc",
            Self::ValueAsc => "value_asc",
            Self::NextEventAsc => "next_event_asc",
        }
    }
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "value_desc" => Ok(Self::ValueDesc),
            "value_asc" => Ok(Self::ValueAsc),
            "next_event_asc" => Ok(Self::NextEventAsc),
            other => Err(format!("unknown ordering policy '{}'", other)),
        }
    }
}
