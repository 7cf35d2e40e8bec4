//! Startup wiring: locate providers, build the service pair.

use crate::artifact::ArtifactService;
use crate::query::QueryService;
use sramp_core::{RepositoryConfig, SrampResult};
use sramp_expand::{ArchiveExpanderProvider, ExpanderRegistry};
use sramp_storage::{BackendRegistry, InMemoryProvider};

/// The assembled repository: artifact operations plus query evaluation over
/// one shared backend.
pub struct Repository {
    pub artifacts: ArtifactService,
    pub queries: QueryService,
}

/// Wire the default deployment: the in-process backend and the tar archive
/// expander, each located through its registry. Fails fast when a registry
/// ends up empty - that is a startup error, never a per-request one.
pub fn bootstrap(config: RepositoryConfig) -> SrampResult<Repository> {
    let mut backends = BackendRegistry::new();
    backends.register(Box::new(InMemoryProvider));
    let backend = backends.locate()?;

    let mut expanders = ExpanderRegistry::new();
    expanders.register(Box::new(ArchiveExpanderProvider::new(config.clone())));
    let expander = expanders.locate()?;

    tracing::debug!("repository bootstrapped");
    Ok(Repository {
        artifacts: ArtifactService::with_config(backend.clone(), expander, config.clone()),
        queries: QueryService::with_config(backend, &config),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sramp_core::{QueryParams, SrampError};
    use sramp_storage::ContentSource;

    #[test]
    fn test_bootstrap_wires_shared_backend() {
        let repo = bootstrap(RepositoryConfig::default()).unwrap();
        let created = repo
            .artifacts
            .create(
                "core",
                "XmlDocument",
                Some("doc.xml"),
                None,
                ContentSource::from_bytes(b"<doc/>".to_vec()),
            )
            .unwrap();

        // Visible through the query service: same backend instance.
        let result = repo
            .queries
            .query(&QueryParams::for_expression("/s-ramp/core/XmlDocument"))
            .unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.rows[0].uuid, created.uuid);
    }

    #[test]
    fn test_empty_registry_is_fatal() {
        let registry = BackendRegistry::new();
        let err = registry.locate().err().unwrap();
        assert!(matches!(err, SrampError::Config(_)));
    }
}
