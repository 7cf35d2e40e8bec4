//! Inclusion filtering for archive entries.

use crate::archive::ArchiveEntry;
use globset::{Glob, GlobSet, GlobSetBuilder};
use sramp_core::{config::default_denylist, ConfigError, RepositoryConfig};

/// Decides, per inner entry, whether it becomes a derived artifact.
pub trait ArtifactFilter: Send + Sync {
    fn should_include(&self, entry: &ArchiveEntry) -> bool;
}

/// Accepts every entry except those matching a glob denylist.
///
/// The built-in patterns cover archive housekeeping (manifest and signature
/// files); deployments swap the list wholesale through
/// [`RepositoryConfig::expansion_denylist`].
#[derive(Debug)]
pub struct DefaultArtifactFilter {
    denylist: GlobSet,
}

impl DefaultArtifactFilter {
    /// Filter with the built-in denylist.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_patterns(&default_denylist())
    }

    /// Filter with an explicit denylist.
    pub fn with_patterns(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::Invalid {
                reason: format!("bad denylist pattern '{}': {}", pattern, e),
            })?;
            builder.add(glob);
        }
        let denylist = builder.build().map_err(|e| ConfigError::Invalid {
            reason: format!("denylist failed to build: {}", e),
        })?;
        Ok(Self { denylist })
    }

    /// Filter configured from the repository config.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self, ConfigError> {
        Self::with_patterns(&config.expansion_denylist)
    }
}

impl ArtifactFilter for DefaultArtifactFilter {
    fn should_include(&self, entry: &ArchiveEntry) -> bool {
        !self.denylist.is_match(&entry.path)
    }
}

// =============================================================================
// TESTS
// =============================================================================
