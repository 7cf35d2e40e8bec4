//! Expander provider wiring.
//!
//! Same locator discipline as the persistence backend: explicit registration
//! at startup, first provider wins, and an empty registry is a fatal
//! configuration error.

use crate::expander::{ArchiveExpander, Expander};
use once_cell::sync::OnceCell;
use sramp_core::{ConfigError, RepositoryConfig, SrampResult};
use std::sync::Arc;

/// Factory for an expansion strategy.
pub trait ExpanderProvider: Send + Sync {
    /// Short name used in logs and configuration.
    fn name(&self) -> &str;

    /// Build the expander instance this provider supplies.
    fn create(&self) -> SrampResult<Arc<dyn Expander>>;
}

/// Explicit provider registry for expanders.
#[derive(Default)]
pub struct ExpanderRegistry {
    providers: Vec<Box<dyn ExpanderProvider>>,
}

impl ExpanderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Box<dyn ExpanderProvider>) -> &mut Self {
        tracing::debug!(provider = provider.name(), "registered expander provider");
        self.providers.push(provider);
        self
    }

    /// Locate the expander: the first registered provider's instance.
    pub fn locate(&self) -> SrampResult<Arc<dyn Expander>> {
        match self.providers.first() {
            Some(provider) => provider.create(),
            None => Err(ConfigError::NoProviderConfigured {
                concern: "derived-artifact expander".to_string(),
            }
            .into()),
        }
    }
}

/// Provider for the tar archive expander.
#[derive(Debug, Default)]
pub struct ArchiveExpanderProvider {
    config: RepositoryConfig,
}

impl ArchiveExpanderProvider {
    pub fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }
}

impl ExpanderProvider for ArchiveExpanderProvider {
    fn name(&self) -> &str {
        "tar-archive"
    }

    fn create(&self) -> SrampResult<Arc<dyn Expander>> {
        Ok(Arc::new(ArchiveExpander::from_config(&self.config)?))
    }
}

static GLOBAL_EXPANDER: OnceCell<Arc<dyn Expander>> = OnceCell::new();

/// Install the process-wide expander singleton.
pub fn install_expander(expander: Arc<dyn Expander>) -> SrampResult<()> {
    GLOBAL_EXPANDER.set(expander).map_err(|_| {
        ConfigError::Invalid {
            reason: "expander already installed".to_string(),
        }
        .into()
    })
}

/// The installed process-wide expander.
pub fn global_expander() -> SrampResult<Arc<dyn Expander>> {
    GLOBAL_EXPANDER.get().cloned().ok_or_else(|| {
        ConfigError::NoProviderConfigured {
            concern: "derived-artifact expander".to_string(),
        }
        .into()
    })
}

// =============================================================================
// TESTS
// =============================================================================
