//! Expansion of compound artifacts into derived children.

use crate::archive::{ArchiveEntry, ArchiveReader, TarArchiveReader};
use crate::filter::{ArtifactFilter, DefaultArtifactFilter};
use sramp_core::{
    determine_mime_type, Artifact, ArtifactKind, ArtifactType, ConfigError, ExpandError,
    ExpansionReport, RepositoryConfig, SrampResult,
};
use sramp_storage::{ContentSource, PersistenceBackend};

/// Expansion strategy: turn a compound parent's content into persisted
/// derived children.
///
/// Implementations are process-wide, shared singletons and must be safe for
/// concurrent use. Expansion is eager and single-pass over the content, one
/// level deep: children are never expanded themselves.
pub trait Expander: Send + Sync {
    /// Expand `content` under `parent`, persisting each accepted entry as a
    /// derived child through the backend.
    ///
    /// A single malformed entry is a recoverable, per-entry failure: the
    /// remaining entries are still processed and persisted, and the call
    /// then fails with a partial-expansion error carrying the report so the
    /// caller can decide whether to keep the partial result.
    fn expand(
        &self,
        parent: &Artifact,
        content: ContentSource,
        backend: &dyn PersistenceBackend,
    ) -> SrampResult<Vec<Artifact>>;
}

/// Expander over tar-format compound content.
pub struct ArchiveExpander {
    filter: Box<dyn ArtifactFilter>,
}

impl ArchiveExpander {
    /// Expander with the built-in inclusion filter.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            filter: Box::new(DefaultArtifactFilter::new()?),
        })
    }

    /// Expander with a custom inclusion filter.
    pub fn with_filter(filter: Box<dyn ArtifactFilter>) -> Self {
        Self { filter }
    }

    /// Expander with the denylist from the repository config.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            filter: Box::new(DefaultArtifactFilter::from_config(config)?),
        })
    }

    /// Expand entries already pulled from a reader. Split out from
    /// [`Expander::expand`] so alternative reader implementations plug in.
    pub fn expand_from_reader(
        &self,
        parent: &Artifact,
        reader: &mut dyn ArchiveReader,
        backend: &dyn PersistenceBackend,
    ) -> SrampResult<Vec<Artifact>> {
        let mut report = ExpansionReport::default();
        let mut children = Vec::new();

        for outcome in reader.read_entries()? {
            let entry = match outcome {
                Ok(entry) => entry,
                Err(failure) => {
                    tracing::warn!(
                        parent = %parent.uuid,
                        entry = %failure.entry_path,
                        reason = %failure.reason,
                        "skipping malformed archive entry"
                    );
                    report.failures.push(failure);
                    continue;
                }
            };

            if !self.filter.should_include(&entry) {
                tracing::debug!(parent = %parent.uuid, entry = %entry.path, "entry excluded by filter");
                continue;
            }

            let child = derive_child(&entry);
            match backend.persist_derived(
                parent.uuid,
                child,
                Some(ContentSource::from_bytes(entry.content)),
            ) {
                Ok(persisted) => children.push(persisted),
                Err(e) => report.record(&entry.path, &e.to_string()),
            }
        }

        if report.is_clean() {
            tracing::debug!(parent = %parent.uuid, children = children.len(), "expansion complete");
            Ok(children)
        } else {
            Err(ExpandError::Partial { report }.into())
        }
    }
}

impl Expander for ArchiveExpander {
    fn expand(
        &self,
        parent: &Artifact,
        content: ContentSource,
        backend: &dyn PersistenceBackend,
    ) -> SrampResult<Vec<Artifact>> {
        let mut reader = TarArchiveReader::for_file_name(content, &parent.name);
        self.expand_from_reader(parent, &mut reader, backend)
    }
}

/// Build the child record for an accepted entry: typed by its file name,
/// named after the entry's final path segment, with the full entry path
/// retained as a property.
fn derive_child(entry: &ArchiveEntry) -> Artifact {
    let kind = ArtifactKind::from_file_name(&entry.path);
    let mime_type = determine_mime_type(None, Some(&entry.path), &kind);
    let name = entry
        .path
        .rsplit('/')
        .next()
        .unwrap_or(entry.path.as_str())
        .to_string();
    Artifact::new(ArtifactType::new(kind).with_mime_type(&mime_type))
        .with_name(&name)
        .with_property("entryPath", &entry.path)
}

// =============================================================================
// TESTS
// =============================================================================
