//! # World Configuration
//!
//! Optional TOML file read once at startup.
//!
//! ```toml
//! # Dense slots reserved in every component pool when it is created.
//! pool_capacity = 4096
//! # Entity ids the liveness set can hold before growing.
//! entity_capacity = 65536
//! ```
//!
//! Missing keys fall back to [`WorldConfig::default`]. Unknown keys are
//! rejected so typos do not pass silently.

use std::path::Path;

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Capacity hints for a [`World`](crate::World).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Dense slots reserved in every new component pool.
    pub pool_capacity: usize,
    /// Entity ids reserved in the liveness set.
    pub entity_capacity: usize,
}

impl WorldConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if the text is not valid TOML or does not
    /// match the schema.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        toml::from_str(text).map_err(|err| EcsError::InvalidConfig(err.to_string()))
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| EcsError::InvalidConfig(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
