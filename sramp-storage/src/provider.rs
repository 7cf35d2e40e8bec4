//! Backend provider wiring.
//!
//! Deployments supply exactly one persistence backend. Providers are
//! registered explicitly at startup (constructor wiring, no runtime
//! discovery) and located once; a registry with no provider is a fatal
//! configuration error, not a per-request condition.

use crate::memory::InMemoryBackend;
use crate::PersistenceBackend;
use once_cell::sync::OnceCell;
use sramp_core::{ConfigError, SrampResult};
use std::sync::Arc;

/// Factory for a persistence backend implementation.
pub trait BackendProvider: Send + Sync {
    /// Short name used in logs and configuration.
    fn name(&self) -> &str;

    /// Build the backend instance this provider supplies.
    fn create(&self) -> SrampResult<Arc<dyn PersistenceBackend>>;
}

/// Explicit provider registry. The first registered provider wins, matching
/// the expectation that a running process carries exactly one.
#[derive(Default)]
pub struct BackendRegistry {
    providers: Vec<Box<dyn BackendProvider>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Later registrations are kept but only reached
    /// if earlier ones are removed; production wiring registers one.
    pub fn register(&mut self, provider: Box<dyn BackendProvider>) -> &mut Self {
        tracing::debug!(provider = provider.name(), "registered backend provider");
        self.providers.push(provider);
        self
    }

    /// Locate the backend: the first registered provider's instance.
    /// Fails fast when nothing is registered.
    pub fn locate(&self) -> SrampResult<Arc<dyn PersistenceBackend>> {
        match self.providers.first() {
            Some(provider) => provider.create(),
            None => Err(ConfigError::NoProviderConfigured {
                concern: "persistence backend".to_string(),
            }
            .into()),
        }
    }
}

/// Provider for the in-process reference backend.
#[derive(Debug, Default)]
pub struct InMemoryProvider;

impl BackendProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn create(&self) -> SrampResult<Arc<dyn PersistenceBackend>> {
        Ok(Arc::new(InMemoryBackend::new()))
    }
}

static GLOBAL_BACKEND: OnceCell<Arc<dyn PersistenceBackend>> = OnceCell::new();

/// Install the process-wide backend singleton. Called once at startup after
/// locating the provider; a second install is a configuration error.
pub fn install_backend(backend: Arc<dyn PersistenceBackend>) -> SrampResult<()> {
    GLOBAL_BACKEND.set(backend).map_err(|_| {
        ConfigError::Invalid {
            reason: "persistence backend already installed".to_string(),
        }
        .into()
    })
}

/// The installed process-wide backend.
pub fn global_backend() -> SrampResult<Arc<dyn PersistenceBackend>> {
    GLOBAL_BACKEND.get().cloned().ok_or_else(|| {
        ConfigError::NoProviderConfigured {
            concern: "persistence backend".to_string(),
        }
        .into()
    })
}

// =============================================================================
// TESTS
// =============================================================================
