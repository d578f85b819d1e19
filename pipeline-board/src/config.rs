//! Board configuration using Figment
//!
//! Sources, later ones override earlier ones:
//! 1. Built-in defaults
//! 2. `.pipeline/board.{toml,yaml,yml,json}` under a base directory
//! 3. Environment variables prefixed `PIPELINE_` (nested keys split on `__`,
//!    e.g. `PIPELINE_MESSAGES__MOVE_FAILED`)

use crate::types::OrderingPolicy;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Directory holding board config files, relative to the base directory
pub const CONFIG_DIR: &str = ".pipeline";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PIPELINE_";

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration parsing failed
    #[error("failed to parse configuration: {source}")]
    Parse {
        #[source]
        source: Box<figment::Error>,
    },

    /// A value is out of range or empty
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Parse {
            source: Box::new(error),
        }
    }
}

impl ConfigError {
    fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// User-visible notification texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub move_failed: String,
    pub move_in_progress: String,
    pub reorder_failed: String,
    pub role_failed: String,
    pub moved: String,
    pub reordered: String,
    pub role_updated: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            move_failed: "Could not move contact. It has been returned to its previous status."
                .into(),
            move_in_progress: "This contact is still being moved. Try again in a moment.".into(),
            reorder_failed: "Could not save the new column order.".into(),
            role_failed: "Could not update the status role. Reloaded the current roles.".into(),
            moved: "Contact moved.".into(),
            reordered: "Column order saved.".into(),
            role_updated: "Status role updated.".into(),
        }
    }
}

impl Messages {
    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("messages.move_failed", &self.move_failed),
            ("messages.move_in_progress", &self.move_in_progress),
            ("messages.reorder_failed", &self.reorder_failed),
            ("messages.role_failed", &self.role_failed),
            ("messages.moved", &self.moved),
            ("messages.reordered", &self.reordered),
            ("messages.role_updated", &self.role_updated),
        ]
    }
}

/// Settings for a board session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Ordering policy a new session starts with
    pub default_ordering: OrderingPolicy,
    /// Fire a success toast when a mutation is confirmed
    pub notify_success: bool,
    /// How many activity entries a session keeps
    pub activity_capacity: usize,
    pub messages: Messages,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_ordering: OrderingPolicy::Manual,
            notify_success: true,
            activity_capacity: 200,
            messages: Messages::default(),
        }
    }
}

impl BoardConfig {
    /// Load configuration for the current working directory
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(cwd)
    }

    /// Load configuration with `base` as the project directory
    pub fn load_from(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: BoardConfig = Self::figment(base.as_ref()).extract()?;
        config.validate()?;
        debug!(
            ordering = %config.default_ordering,
            notify_success = config.notify_success,
            "loaded board configuration"
        );
        Ok(config)
    }

    fn figment(base: &Path) -> Figment {
        let dir = base.join(CONFIG_DIR);
        Figment::from(Serialized::defaults(BoardConfig::default()))
            .merge(Toml::file(dir.join("board.toml")))
            .merge(Yaml::file(dir.join("board.yaml")))
            .merge(Yaml::file(dir.join("board.yml")))
            .merge(Json::file(dir.join("board.json")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.activity_capacity == 0 {
            return Err(ConfigError::invalid("activity_capacity", "must be > 0"));
        }
        for (key, value) in self.messages.entries() {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(key, "must not be empty"));
            }
        }
        Ok(())
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.default_ordering = ordering;
        self
    }

    pub fn with_notify_success(mut self, notify: bool) -> Self {
        self.notify_success = notify;
        self
    }

    pub fn with_activity_capacity(mut self, capacity: usize) -> Self {
        self.activity_capacity = capacity;
        self
    }
}
