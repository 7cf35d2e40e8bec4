//! Repository configuration.

use crate::error::ConfigError;
use crate::params::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// Tunables for the repository services and the expansion pipeline.
///
/// Every field has a default, so a partial TOML document only overrides the
/// keys it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Page size used when a query supplies none.
    pub default_page_size: u32,
    /// Run expansion automatically when created content is compound.
    pub expand_on_create: bool,
    /// Glob patterns for archive entries that never become artifacts.
    /// Replaces the built-in set wholesale when present in a config file.
    pub expansion_denylist: Vec<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            expand_on_create: true,
            expansion_denylist: default_denylist(),
        }
    }
}

/// Archive-housekeeping entries excluded from expansion by default.
pub fn default_denylist() -> Vec<String> {
    [
        "META-INF/MANIFEST.MF",
        "META-INF/*.SF",
        "META-INF/*.DSA",
        "META-INF/*.RSA",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl RepositoryConfig {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })
    }

    /// Render this configuration as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })
    }
}
