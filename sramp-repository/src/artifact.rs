//! Artifact operations: create, read, update, delete, expand.

use chrono::{DateTime, Utc};
use sramp_core::{
    determine_mime_type, Artifact, ArtifactId, ArtifactType, RepositoryConfig, SrampResult,
    StorageError, Timestamp,
};
use sramp_expand::Expander;
use sramp_storage::{ContentSource, ContentStream, PersistenceBackend};
use std::sync::Arc;

/// Result of a content fetch: the byte stream plus the response metadata a
/// wire binding needs (declared size, last-modified, MIME type).
#[derive(Debug)]
pub struct ContentFetch {
    pub stream: ContentStream,
    pub name: String,
    pub mime_type: String,
    pub size: Option<i64>,
    pub last_modified: Timestamp,
}

impl ContentFetch {
    /// Last-modified in the HTTP date format.
    pub fn last_modified_http(&self) -> String {
        http_date(self.last_modified)
    }
}

/// Format a timestamp for an HTTP Last-Modified header. Plain function; no
/// per-thread formatter state.
pub fn http_date(ts: DateTime<Utc>) -> String {
    ts.to_rfc2822()
}

/// Artifact operations over the located backend and expander.
///
/// Holds no per-request state; a single instance serves concurrent callers.
pub struct ArtifactService {
    backend: Arc<dyn PersistenceBackend>,
    expander: Arc<dyn Expander>,
    config: RepositoryConfig,
}

impl ArtifactService {
    pub fn new(backend: Arc<dyn PersistenceBackend>, expander: Arc<dyn Expander>) -> Self {
        Self::with_config(backend, expander, RepositoryConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn PersistenceBackend>,
        expander: Arc<dyn Expander>,
        config: RepositoryConfig,
    ) -> Self {
        Self {
            backend,
            expander,
            config,
        }
    }

    /// Create an artifact from raw content.
    ///
    /// The MIME type resolves from the content-type header (unless generic),
    /// then the file name, then the type's default; the name falls back to a
    /// type-appropriate synthetic one. Compound content is expanded after
    /// the persist when `expand_on_create` is set.
    pub fn create(
        &self,
        model: &str,
        type_name: &str,
        file_name: Option<&str>,
        content_type: Option<&str>,
        content: ContentSource,
    ) -> SrampResult<Artifact> {
        let artifact_type = ArtifactType::resolve(model, type_name)?;
        let mime_type = determine_mime_type(content_type, file_name, &artifact_type.kind);
        let name = file_name
            .map(str::to_string)
            .unwrap_or_else(|| artifact_type.kind.default_file_name());

        let record = Artifact::new(artifact_type.with_mime_type(&mime_type)).with_name(&name);
        let persisted = self.backend.persist(record, Some(content))?;
        tracing::debug!(uuid = %persisted.uuid, %name, "created artifact");

        self.expand_if_compound(&persisted)?;
        Ok(persisted)
    }

    /// Create from a paired metadata record plus content.
    ///
    /// The record's type must agree with the (model, type) the request was
    /// addressed to; its name participates in MIME resolution.
    pub fn create_with_metadata(
        &self,
        model: &str,
        type_name: &str,
        mut record: Artifact,
        content_type: Option<&str>,
        content: ContentSource,
    ) -> SrampResult<Artifact> {
        let endpoint_type = ArtifactType::resolve(model, type_name)?;
        if record.artifact_type.kind != endpoint_type.kind {
            return Err(StorageError::InvalidOperation {
                reason: format!(
                    "attempted to create a '{}' through the '{}' endpoint",
                    record.artifact_type.kind, endpoint_type.kind
                ),
            }
            .into());
        }

        let mime_type =
            determine_mime_type(content_type, Some(&record.name), &endpoint_type.kind);
        record.artifact_type.mime_type = mime_type;

        let persisted = self.backend.persist(record, Some(content))?;
        self.expand_if_compound(&persisted)?;
        Ok(persisted)
    }

    /// Create a metadata-only artifact (no content payload).
    pub fn create_record(
        &self,
        model: &str,
        type_name: &str,
        record: Artifact,
    ) -> SrampResult<Artifact> {
        let endpoint_type = ArtifactType::resolve(model, type_name)?;
        if record.artifact_type.kind != endpoint_type.kind {
            return Err(StorageError::InvalidOperation {
                reason: format!(
                    "attempted to create a '{}' through the '{}' endpoint",
                    record.artifact_type.kind, endpoint_type.kind
                ),
            }
            .into());
        }
        self.backend.persist(record, None)
    }

    /// Fetch an artifact's metadata.
    pub fn get_metadata(
        &self,
        model: &str,
        type_name: &str,
        uuid: ArtifactId,
    ) -> SrampResult<Artifact> {
        let artifact_type = ArtifactType::resolve(model, type_name)?;
        self.backend.get(uuid, &artifact_type)
    }

    /// Fetch an artifact's content stream plus response metadata.
    pub fn get_content(
        &self,
        model: &str,
        type_name: &str,
        uuid: ArtifactId,
    ) -> SrampResult<ContentFetch> {
        let artifact_type = ArtifactType::resolve(model, type_name)?;
        let artifact = self.backend.get(uuid, &artifact_type)?;
        let stream = self.backend.get_content(uuid, &artifact_type)?;
        Ok(ContentFetch {
            stream,
            name: artifact.name,
            mime_type: artifact.artifact_type.mime_type,
            size: artifact.content_size,
            last_modified: artifact.modified_at,
        })
    }

    /// Replace an artifact's mutable metadata. The record's version stamp
    /// must match the stored one; a stale stamp loses with a conflict.
    pub fn update_metadata(
        &self,
        model: &str,
        type_name: &str,
        uuid: ArtifactId,
        mut record: Artifact,
    ) -> SrampResult<Artifact> {
        let artifact_type = ArtifactType::resolve(model, type_name)?;
        record.uuid = uuid;
        record.artifact_type.kind = artifact_type.kind;
        self.backend.update_metadata(&record)
    }

    /// Replace an artifact's content with a new version.
    pub fn update_content(
        &self,
        model: &str,
        type_name: &str,
        uuid: ArtifactId,
        content: ContentSource,
    ) -> SrampResult<Artifact> {
        let artifact_type = ArtifactType::resolve(model, type_name)?;
        let updated = self.backend.update_content(uuid, &artifact_type, content)?;
        tracing::debug!(%uuid, version = updated.version, "replaced artifact content");
        Ok(updated)
    }

    /// Delete an artifact (and, with it, any derived children it owns).
    /// Absence is a `NotFound`; callers wanting idempotent deletes treat
    /// that as success themselves.
    pub fn delete(&self, model: &str, type_name: &str, uuid: ArtifactId) -> SrampResult<()> {
        let artifact_type = ArtifactType::resolve(model, type_name)?;
        self.backend.delete(uuid, &artifact_type)
    }

    /// Expand a compound artifact's content into derived children.
    pub fn expand(
        &self,
        model: &str,
        type_name: &str,
        uuid: ArtifactId,
    ) -> SrampResult<Vec<Artifact>> {
        let artifact_type = ArtifactType::resolve(model, type_name)?;
        let artifact = self.backend.get(uuid, &artifact_type)?;
        if !artifact.artifact_type.is_compound() {
            return Err(StorageError::InvalidOperation {
                reason: format!(
                    "artifact {} has content type '{}', which is not compound",
                    uuid, artifact.artifact_type.mime_type
                ),
            }
            .into());
        }
        let stream = self.backend.get_content(uuid, &artifact_type)?;
        self.expander
            .expand(&artifact, ContentSource::new(stream), self.backend.as_ref())
    }

    fn expand_if_compound(&self, artifact: &Artifact) -> SrampResult<()> {
        if !self.config.expand_on_create || !artifact.artifact_type.is_compound() {
            return Ok(());
        }
        let stream = self
            .backend
            .get_content(artifact.uuid, &artifact.artifact_type)?;
        let children = self.expander.expand(
            artifact,
            ContentSource::new(stream),
            self.backend.as_ref(),
        )?;
        tracing::debug!(uuid = %artifact.uuid, children = children.len(), "expanded on create");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
