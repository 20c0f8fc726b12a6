//! Mapper configuration
//!
//! Defaults can be overridden per [`Mapper`](crate::Mapper) or for the whole
//! process through environment variables:
//! - `TAGMAP_MAX_DEPTH`: maximum nesting depth of record recursion

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const MAX_DEPTH_VAR: &str = "TAGMAP_MAX_DEPTH";

/// Tunables of a mapping run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Nested record levels allowed below the top-level record
    pub max_depth: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

impl MapperConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    ///
    /// Invalid values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_DEPTH_VAR) {
            match raw.trim().parse() {
                Ok(depth) => config.max_depth = depth,
                Err(_) => log::warn!("ignoring {}={:?}: not a non-negative integer", MAX_DEPTH_VAR, raw),
            }
        }

        config
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Configuration read from the environment on first use
pub(crate) fn process() -> &'static MapperConfig {
    static PROCESS: OnceLock<MapperConfig> = OnceLock::new();
    PROCESS.get_or_init(MapperConfig::from_env)
}
