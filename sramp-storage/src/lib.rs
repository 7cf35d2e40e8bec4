//! SRAMP Storage - Persistence Backend Contract and Reference Implementation
//!
//! Defines the storage abstraction for artifacts: the [`PersistenceBackend`]
//! trait, the content streaming types, the provider locator, and
//! [`InMemoryBackend`], the in-process reference implementation.

pub mod content;
pub mod memory;
pub mod provider;

pub use content::{ContentSource, ContentStream};
pub use memory::InMemoryBackend;
pub use provider::{
    global_backend, install_backend, BackendProvider, BackendRegistry, InMemoryProvider,
};

use sramp_core::{Artifact, ArtifactId, ArtifactType, QueryOptions, QueryResultSet, SrampResult};
use sramp_query::Query;

/// Storage contract for artifact metadata and content.
///
/// Implementations are process-wide, shared singletons after startup and must
/// be safe for concurrent use by independent callers without external
/// locking. Metadata updates to a single uuid are linearizable: the backend
/// compares the caller's version stamp at write time and fails the losing
/// writer with a version conflict rather than merging or overwriting.
///
/// The derived-type guard lives here, not in callers: `persist` and
/// `update_content` reject artifacts whose kind is derived, so the invariant
/// cannot be bypassed by adding a new entry point. Derived children enter the
/// store only through [`PersistenceBackend::persist_derived`], the path the
/// expander uses.
pub trait PersistenceBackend: Send + Sync {
    /// Persist a new artifact, streaming its content if any.
    ///
    /// Assigns the uuid when the record carries none, stamps both timestamps,
    /// sets the version to 1, and records content size and hash. Fails with
    /// `InvalidOperation` for derived types or an already-used uuid.
    fn persist(&self, artifact: Artifact, content: Option<ContentSource>)
        -> SrampResult<Artifact>;

    /// Persist an expansion-produced child under its owning parent.
    ///
    /// Attaches the derived relationship to `parent` and skips the
    /// derived-type guard. Fails with `NotFound` when the parent is gone.
    fn persist_derived(
        &self,
        parent: ArtifactId,
        artifact: Artifact,
        content: Option<ContentSource>,
    ) -> SrampResult<Artifact>;

    /// Get an artifact by uuid and type. Fails with `NotFound` when no
    /// record with that uuid/type combination exists.
    fn get(&self, uuid: ArtifactId, artifact_type: &ArtifactType) -> SrampResult<Artifact>;

    /// Open the artifact's content as a lazy, single-pass byte stream.
    ///
    /// The underlying resource is released when the stream is fully drained
    /// or dropped, including on early abort. Fails with `NotFound` for a
    /// missing record and `InvalidOperation` for a metadata-only artifact.
    fn get_content(
        &self,
        uuid: ArtifactId,
        artifact_type: &ArtifactType,
    ) -> SrampResult<ContentStream>;

    /// Replace the artifact's mutable metadata in place.
    ///
    /// Advances `modified_at` and the version stamp; content is untouched.
    /// Fails with `NotFound` for a missing record and `VersionConflict` when
    /// the caller's stamp is stale.
    fn update_metadata(&self, artifact: &Artifact) -> SrampResult<Artifact>;

    /// Replace the artifact's binary payload, recomputing size and hash.
    ///
    /// Advances `modified_at` and the version stamp; the uuid never changes.
    fn update_content(
        &self,
        uuid: ArtifactId,
        artifact_type: &ArtifactType,
        content: ContentSource,
    ) -> SrampResult<Artifact>;

    /// Delete an artifact and release its content.
    ///
    /// Derived children are deleted with their owning parent; deleting a
    /// derived child directly is an `InvalidOperation`. Fails with
    /// `NotFound` when the record is already absent (callers wanting
    /// idempotent deletes treat that as success at their layer).
    fn delete(&self, uuid: ArtifactId, artifact_type: &ArtifactType) -> SrampResult<()>;

    /// Evaluate a parsed query: match, order, and page.
    ///
    /// The sort key is `order_by` when present, uuid otherwise; ties are
    /// always broken by uuid ascending so that repeated calls with identical
    /// parameters page deterministically. `total_count` reflects the full
    /// match set before paging.
    fn query(&self, query: &Query, options: &QueryOptions) -> SrampResult<QueryResultSet>;
}
