//! In-process reference implementation of the persistence backend.

use crate::content::{ContentSource, ContentStream};
use crate::PersistenceBackend;
use chrono::Utc;
use sramp_core::{
    new_artifact_id, Artifact, ArtifactId, ArtifactSummary, ArtifactType, QueryOptions,
    QueryResultSet, RelationshipKind, SrampError, SrampResult, StorageError,
};
use sramp_query::Query;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory backend: RwLock'd maps for records and content.
///
/// Mutations take the write lock, so the version-stamp comparison and the
/// subsequent write are a single atomic step per uuid. Content payloads are
/// shared via `Arc`, so an open read stream keeps its bytes alive even if the
/// artifact is deleted mid-read.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    records: RwLock<HashMap<Uuid, Artifact>>,
    content: RwLock<HashMap<Uuid, Arc<Vec<u8>>>>,
    open_streams: Arc<AtomicUsize>,
}

impl InMemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts.
    pub fn artifact_count(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Number of content streams currently open against this backend.
    /// Returns to zero once every stream is drained or dropped.
    pub fn open_stream_count(&self) -> usize {
        self.open_streams.load(AtomicOrdering::SeqCst)
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
        if let Ok(mut content) = self.content.write() {
            content.clear();
        }
    }

    fn read_records(&self) -> SrampResult<RwLockReadGuard<'_, HashMap<Uuid, Artifact>>> {
        self.records
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write_records(&self) -> SrampResult<RwLockWriteGuard<'_, HashMap<Uuid, Artifact>>> {
        self.records
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write_content(&self) -> SrampResult<RwLockWriteGuard<'_, HashMap<Uuid, Arc<Vec<u8>>>>> {
        self.content
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn not_found(uuid: ArtifactId, artifact_type: &ArtifactType) -> SrampError {
        StorageError::NotFound {
            uuid,
            type_name: artifact_type.kind.type_name().to_string(),
        }
        .into()
    }

    /// Drain an inbound payload into a record, stamping size and hash.
    fn ingest(
        artifact: &mut Artifact,
        content: Option<ContentSource>,
    ) -> SrampResult<Option<Vec<u8>>> {
        match content {
            None => Ok(None),
            Some(source) => {
                let (bytes, size, hash) = source.drain().map_err(|e| StorageError::Io {
                    reason: e.to_string(),
                })?;
                artifact.content_size = Some(size);
                artifact.content_hash = Some(hash);
                Ok(Some(bytes))
            }
        }
    }

    /// Shared insert path for `persist` and `persist_derived`. The parent
    /// check and the insert happen under one write lock, so an expansion
    /// child can never slip in after its parent's deletion.
    fn insert(
        &self,
        mut artifact: Artifact,
        content: Option<ContentSource>,
        parent: Option<ArtifactId>,
    ) -> SrampResult<Artifact> {
        if artifact.uuid.is_nil() {
            artifact.uuid = new_artifact_id();
        }
        let now = Utc::now();
        artifact.created_at = now;
        artifact.modified_at = now;
        artifact.version = 1;
        let bytes = Self::ingest(&mut artifact, content)?;

        let mut records = self.write_records()?;
        if let Some(parent) = parent {
            let parent_record = records.get(&parent).ok_or_else(|| {
                SrampError::from(StorageError::NotFound {
                    uuid: parent,
                    type_name: "parent".to_string(),
                })
            })?;
            // One level deep: an expansion product never owns children.
            if parent_record.derived_from().is_some() {
                return Err(StorageError::InvalidOperation {
                    reason: "cannot derive from an artifact that is itself derived".to_string(),
                }
                .into());
            }
        }
        if records.contains_key(&artifact.uuid) {
            return Err(StorageError::InvalidOperation {
                reason: format!("artifact {} already exists", artifact.uuid),
            }
            .into());
        }
        if let Some(bytes) = bytes {
            self.write_content()?.insert(artifact.uuid, Arc::new(bytes));
        }
        records.insert(artifact.uuid, artifact.clone());
        tracing::debug!(uuid = %artifact.uuid, kind = %artifact.artifact_type.kind, "persisted artifact");
        Ok(artifact)
    }
}

impl PersistenceBackend for InMemoryBackend {
    fn persist(
        &self,
        artifact: Artifact,
        content: Option<ContentSource>,
    ) -> SrampResult<Artifact> {
        // The derived-type guard is centralized here so no caller can route
        // around it.
        if artifact.artifact_type.kind.is_derived() {
            return Err(StorageError::InvalidOperation {
                reason: format!(
                    "cannot create '{}' directly: derived types are only produced by expansion",
                    artifact.artifact_type.kind
                ),
            }
            .into());
        }
        self.insert(artifact, content, None)
    }

    fn persist_derived(
        &self,
        parent: ArtifactId,
        artifact: Artifact,
        content: Option<ContentSource>,
    ) -> SrampResult<Artifact> {
        let artifact = artifact.with_relationship(RelationshipKind::DerivedFrom, parent);
        self.insert(artifact, content, Some(parent))
    }

    fn get(&self, uuid: ArtifactId, artifact_type: &ArtifactType) -> SrampResult<Artifact> {
        let records = self.read_records()?;
        records
            .get(&uuid)
            .filter(|a| a.artifact_type.kind == artifact_type.kind)
            .cloned()
            .ok_or_else(|| Self::not_found(uuid, artifact_type))
    }

    fn get_content(
        &self,
        uuid: ArtifactId,
        artifact_type: &ArtifactType,
    ) -> SrampResult<ContentStream> {
        // Existence and type check first, so a metadata-only artifact is
        // distinguishable from a missing one.
        let _artifact = self.get(uuid, artifact_type)?;
        let bytes = {
            let content = self
                .content
                .read()
                .map_err(|_| SrampError::from(StorageError::LockPoisoned))?;
            content.get(&uuid).cloned()
        };
        let bytes = bytes.ok_or_else(|| {
            SrampError::from(StorageError::InvalidOperation {
                reason: format!("artifact {} has no content", uuid),
            })
        })?;

        self.open_streams.fetch_add(1, AtomicOrdering::SeqCst);
        let open_streams = Arc::clone(&self.open_streams);
        Ok(ContentStream::new(ArcReader::new(bytes), move || {
            open_streams.fetch_sub(1, AtomicOrdering::SeqCst);
        }))
    }

    fn update_metadata(&self, artifact: &Artifact) -> SrampResult<Artifact> {
        let mut records = self.write_records()?;
        let stored = records
            .get_mut(&artifact.uuid)
            .filter(|a| a.artifact_type.kind == artifact.artifact_type.kind)
            .ok_or_else(|| Self::not_found(artifact.uuid, &artifact.artifact_type))?;

        if stored.version != artifact.version {
            return Err(StorageError::VersionConflict {
                uuid: artifact.uuid,
                expected: artifact.version,
                actual: stored.version,
            }
            .into());
        }

        stored.name = artifact.name.clone();
        stored.description = artifact.description.clone();
        stored.artifact_type.mime_type = artifact.artifact_type.mime_type.clone();
        stored.properties = artifact.properties.clone();
        stored.relationships = artifact.relationships.clone();
        stored.modified_at = Utc::now();
        stored.version += 1;
        Ok(stored.clone())
    }

    fn update_content(
        &self,
        uuid: ArtifactId,
        artifact_type: &ArtifactType,
        content: ContentSource,
    ) -> SrampResult<Artifact> {
        // Drain before taking any lock; ingestion is the slow part.
        let (bytes, size, hash) = content.drain().map_err(|e| StorageError::Io {
            reason: e.to_string(),
        })?;

        let mut records = self.write_records()?;
        let stored = records
            .get_mut(&uuid)
            .filter(|a| a.artifact_type.kind == artifact_type.kind)
            .ok_or_else(|| Self::not_found(uuid, artifact_type))?;

        if stored.artifact_type.kind.is_derived() {
            return Err(StorageError::InvalidOperation {
                reason: format!("cannot replace content of derived artifact {}", uuid),
            }
            .into());
        }

        stored.content_size = Some(size);
        stored.content_hash = Some(hash);
        stored.modified_at = Utc::now();
        stored.version += 1;
        let updated = stored.clone();
        self.write_content()?.insert(uuid, Arc::new(bytes));
        Ok(updated)
    }

    fn delete(&self, uuid: ArtifactId, artifact_type: &ArtifactType) -> SrampResult<()> {
        let mut records = self.write_records()?;
        let stored = records
            .get(&uuid)
            .filter(|a| a.artifact_type.kind == artifact_type.kind)
            .ok_or_else(|| Self::not_found(uuid, artifact_type))?;

        if stored.derived_from().is_some() {
            return Err(StorageError::InvalidOperation {
                reason: format!(
                    "derived artifact {} is owned by its parent and cannot be deleted directly",
                    uuid
                ),
            }
            .into());
        }

        // The parent exclusively owns its expansion products.
        let children: Vec<Uuid> = records
            .values()
            .filter(|a| a.derived_from() == Some(uuid))
            .map(|a| a.uuid)
            .collect();

        records.remove(&uuid);
        for child in &children {
            records.remove(child);
        }

        let mut content = self.write_content()?;
        content.remove(&uuid);
        for child in &children {
            content.remove(child);
        }
        tracing::debug!(%uuid, children = children.len(), "deleted artifact");
        Ok(())
    }

    fn query(&self, query: &Query, options: &QueryOptions) -> SrampResult<QueryResultSet> {
        let records = self.read_records()?;
        let mut matches: Vec<&Artifact> = records
            .values()
            .filter(|a| sramp_query::matches(query, a))
            .collect();

        matches.sort_by(|a, b| compare_artifacts(a, b, options));

        let total_count = matches.len() as u64;
        let start = options.paging.start_index as usize;
        let rows = matches
            .into_iter()
            .skip(start)
            .take(options.paging.count as usize)
            .map(|a| ArtifactSummary::of(a, &options.projected_properties))
            .collect();

        Ok(QueryResultSet { total_count, rows })
    }
}

/// Order two artifacts for a result set: the requested sort key first
/// (absent values after present ones), uuid ascending as the unconditional
/// tie-break. Descending direction flips the key comparison only, never the
/// tie-break, so paging stays deterministic either way.
fn compare_artifacts(a: &Artifact, b: &Artifact, options: &QueryOptions) -> Ordering {
    let keyed = match &options.order_by {
        None => Ordering::Equal,
        Some(key) => {
            let va = a.attribute(key);
            let vb = b.attribute(key);
            let cmp = match (&va, &vb) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if options.ascending { cmp } else { cmp.reverse() }
        }
    };
    keyed.then_with(|| a.uuid.cmp(&b.uuid))
}

/// Reader over shared content bytes.
struct ArcReader {
    data: Arc<Vec<u8>>,
    pos: usize,
}

impl ArcReader {
    fn new(data: Arc<Vec<u8>>) -> Self {
        Self { data, pos: 0 }
    }
}

impl Read for ArcReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sramp_core::{ArtifactKind, QueryParams};
    use sramp_query::parse;
    use std::io::Read;

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new()
    }

    fn xml_type() -> ArtifactType {
        ArtifactType::new(ArtifactKind::XmlDocument)
    }

    fn xsd_type() -> ArtifactType {
        ArtifactType::new(ArtifactKind::XsdDocument)
    }

    fn make_document(name: &str) -> Artifact {
        Artifact::new(xml_type()).with_name(name)
    }

    #[test]
    fn test_persist_assigns_uuid_and_stamps() {
        let store = backend();
        let persisted = store.persist(make_document("a.xml"), None).unwrap();
        assert!(persisted.is_persisted());
        assert_eq!(persisted.version, 1);
        assert_eq!(persisted.content_size, None);
    }

    #[test]
    fn test_persist_rejects_derived_type() {
        let store = backend();
        let derived = Artifact::new(ArtifactType::new(ArtifactKind::ElementDeclaration));
        let err = store.persist(derived, None).unwrap_err();
        assert!(matches!(
            err,
            SrampError::Storage(StorageError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_persist_rejects_every_derived_kind() {
        let store = backend();
        for kind in [
            ArtifactKind::ElementDeclaration,
            ArtifactKind::AttributeDeclaration,
            ArtifactKind::SimpleTypeDeclaration,
            ArtifactKind::ComplexTypeDeclaration,
            ArtifactKind::Message,
            ArtifactKind::PortType,
            ArtifactKind::WsdlOperation,
            ArtifactKind::Binding,
            ArtifactKind::WsdlService,
        ] {
            let artifact = Artifact::new(ArtifactType::new(kind));
            assert!(store.persist(artifact, None).is_err());
        }
        assert_eq!(store.artifact_count(), 0);
    }

    #[test]
    fn test_content_roundtrip_is_byte_identical() {
        let store = backend();
        let payload = b"<schema>bytes</schema>".to_vec();
        let persisted = store
            .persist(
                make_document("a.xml"),
                Some(ContentSource::from_bytes(payload.clone())),
            )
            .unwrap();

        assert_eq!(persisted.content_size, Some(payload.len() as i64));
        assert_eq!(
            persisted.content_hash,
            Some(sramp_core::compute_content_hash(&payload))
        );

        let fetched = store
            .get_content(persisted.uuid, &xml_type())
            .unwrap()
            .read_all()
            .unwrap();
        assert_eq!(fetched, payload);
    }

    #[test]
    fn test_get_unknown_uuid_is_not_found() {
        let store = backend();
        let err = store.get(new_artifact_id(), &xml_type()).unwrap_err();
        assert!(matches!(
            err,
            SrampError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_get_with_wrong_type_is_not_found() {
        let store = backend();
        let persisted = store.persist(make_document("a.xml"), None).unwrap();
        assert!(store.get(persisted.uuid, &xsd_type()).is_err());
    }

    #[test]
    fn test_get_content_of_metadata_only_artifact_fails() {
        let store = backend();
        let persisted = store.persist(make_document("a.xml"), None).unwrap();
        let err = store.get_content(persisted.uuid, &xml_type()).unwrap_err();
        assert!(matches!(
            err,
            SrampError::Storage(StorageError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_open_streams_released_on_drop_and_drain() {
        let store = backend();
        let persisted = store
            .persist(
                make_document("a.xml"),
                Some(ContentSource::from_bytes(vec![1u8; 4096])),
            )
            .unwrap();

        let mut stream = store.get_content(persisted.uuid, &xml_type()).unwrap();
        assert_eq!(store.open_stream_count(), 1);
        let mut partial = [0u8; 8];
        stream.read(&mut partial).unwrap();
        drop(stream); // aborted mid-read
        assert_eq!(store.open_stream_count(), 0);

        let stream = store.get_content(persisted.uuid, &xml_type()).unwrap();
        stream.read_all().unwrap();
        assert_eq!(store.open_stream_count(), 0);
    }

    #[test]
    fn test_update_metadata_bumps_version_and_timestamp() {
        let store = backend();
        let persisted = store.persist(make_document("a.xml"), None).unwrap();
        let modified = persisted.clone().with_name("renamed.xml");

        let updated = store.update_metadata(&modified).unwrap();
        assert_eq!(updated.name, "renamed.xml");
        assert_eq!(updated.version, 2);
        assert!(updated.modified_at >= persisted.modified_at);
        assert_eq!(updated.created_at, persisted.created_at);
    }

    #[test]
    fn test_update_metadata_detects_stale_version() {
        let store = backend();
        let persisted = store.persist(make_document("a.xml"), None).unwrap();

        let first = persisted.clone().with_name("first.xml");
        let second = persisted.clone().with_name("second.xml");

        store.update_metadata(&first).unwrap();
        let err = store.update_metadata(&second).unwrap_err();
        assert!(matches!(
            err,
            SrampError::Storage(StorageError::VersionConflict { .. })
        ));

        // The winner's change is intact.
        let current = store.get(persisted.uuid, &xml_type()).unwrap();
        assert_eq!(current.name, "first.xml");
    }

    #[test]
    fn test_racing_updates_exactly_one_wins() {
        let store = Arc::new(backend());
        let persisted = store.persist(make_document("a.xml"), None).unwrap();

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let store = Arc::clone(&store);
                let mut copy = persisted.clone();
                std::thread::spawn(move || {
                    copy.name = format!("writer-{}.xml", i);
                    store.update_metadata(&copy)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    Err(SrampError::Storage(StorageError::VersionConflict { .. }))
                )
            })
            .count();
        assert_eq!(wins, 1);
        assert_eq!(conflicts, 1);
    }

    #[test]
    fn test_update_content_replaces_payload_and_keeps_uuid() {
        let store = backend();
        let persisted = store
            .persist(
                make_document("a.xml"),
                Some(ContentSource::from_bytes(b"v1".to_vec())),
            )
            .unwrap();

        let updated = store
            .update_content(
                persisted.uuid,
                &xml_type(),
                ContentSource::from_bytes(b"version two".to_vec()),
            )
            .unwrap();

        assert_eq!(updated.uuid, persisted.uuid);
        assert_eq!(updated.content_size, Some(11));
        assert_eq!(updated.version, 2);

        let fetched = store
            .get_content(persisted.uuid, &xml_type())
            .unwrap()
            .read_all()
            .unwrap();
        assert_eq!(fetched, b"version two");
    }

    #[test]
    fn test_delete_removes_record_and_content() {
        let store = backend();
        let persisted = store
            .persist(
                make_document("a.xml"),
                Some(ContentSource::from_bytes(b"bytes".to_vec())),
            )
            .unwrap();

        store.delete(persisted.uuid, &xml_type()).unwrap();
        assert!(store.get(persisted.uuid, &xml_type()).is_err());
        assert_eq!(store.artifact_count(), 0);
    }

    #[test]
    fn test_delete_absent_uuid_is_not_found() {
        let store = backend();
        let err = store.delete(new_artifact_id(), &xml_type()).unwrap_err();
        assert!(matches!(
            err,
            SrampError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_persist_derived_attaches_parent_relationship() {
        let store = backend();
        let parent = store.persist(make_document("app.tar"), None).unwrap();
        let child = Artifact::new(xsd_type()).with_name("order.xsd");

        let persisted = store
            .persist_derived(parent.uuid, child, Some(ContentSource::from_bytes(b"x".to_vec())))
            .unwrap();
        assert_eq!(persisted.derived_from(), Some(parent.uuid));
    }

    #[test]
    fn test_persist_derived_accepts_derived_kinds() {
        let store = backend();
        let parent = store.persist(make_document("schema.xsd"), None).unwrap();
        let element = Artifact::new(ArtifactType::new(ArtifactKind::ElementDeclaration))
            .with_name("order");
        assert!(store.persist_derived(parent.uuid, element, None).is_ok());
    }

    #[test]
    fn test_persist_derived_requires_live_parent() {
        let store = backend();
        let child = Artifact::new(xsd_type());
        let err = store
            .persist_derived(new_artifact_id(), child, None)
            .unwrap_err();
        assert!(matches!(
            err,
            SrampError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_expansion_is_one_level_deep() {
        let store = backend();
        let parent = store.persist(make_document("app.tar"), None).unwrap();
        let child = store
            .persist_derived(parent.uuid, Artifact::new(xsd_type()), None)
            .unwrap();
        let grandchild = Artifact::new(xsd_type());
        assert!(store.persist_derived(child.uuid, grandchild, None).is_err());
    }

    #[test]
    fn test_delete_cascades_to_derived_children() {
        let store = backend();
        let parent = store.persist(make_document("app.tar"), None).unwrap();
        let child = store
            .persist_derived(parent.uuid, Artifact::new(xsd_type()), None)
            .unwrap();

        store.delete(parent.uuid, &xml_type()).unwrap();
        assert!(store.get(child.uuid, &xsd_type()).is_err());
        assert_eq!(store.artifact_count(), 0);
    }

    #[test]
    fn test_direct_delete_of_derived_child_is_rejected() {
        let store = backend();
        let parent = store.persist(make_document("app.tar"), None).unwrap();
        let child = store
            .persist_derived(parent.uuid, Artifact::new(xsd_type()), None)
            .unwrap();

        let err = store.delete(child.uuid, &xsd_type()).unwrap_err();
        assert!(matches!(
            err,
            SrampError::Storage(StorageError::InvalidOperation { .. })
        ));
        assert!(store.get(child.uuid, &xsd_type()).is_ok());
    }

    // ========================================================================
    // Query Tests
    // ========================================================================

    fn seeded_store() -> (InMemoryBackend, Vec<Artifact>) {
        let store = backend();
        let mut persisted = Vec::new();
        for i in 0..10 {
            let artifact = Artifact::new(xsd_type())
                .with_name(format!("schema-{:02}.xsd", i).as_str())
                .with_property("rank", &i.to_string());
            persisted.push(store.persist(artifact, None).unwrap());
        }
        (store, persisted)
    }

    #[test]
    fn test_query_by_type_with_total_count() {
        let (store, _) = seeded_store();
        store.persist(make_document("other.xml"), None).unwrap();

        let query = parse("/s-ramp/xsd/XsdDocument").unwrap();
        let result = store.query(&query, &QueryOptions::default()).unwrap();
        assert_eq!(result.total_count, 10);
        assert_eq!(result.rows.len(), 10);
    }

    #[test]
    fn test_query_default_order_is_uuid_ascending() {
        let (store, _) = seeded_store();
        let query = parse("/s-ramp/xsd").unwrap();
        let result = store.query(&query, &QueryOptions::default()).unwrap();
        let uuids: Vec<_> = result.rows.iter().map(|r| r.uuid).collect();
        let mut sorted = uuids.clone();
        sorted.sort();
        assert_eq!(uuids, sorted);
    }

    #[test]
    fn test_query_order_by_name_descending() {
        let (store, _) = seeded_store();
        let query = parse("/s-ramp/xsd").unwrap();
        let params = QueryParams::for_expression("/s-ramp/xsd").with_order("name", false);
        let options = QueryOptions::from_params(&params);

        let result = store.query(&query, &options).unwrap();
        assert_eq!(result.rows[0].name, "schema-09.xsd");
        assert_eq!(result.rows[9].name, "schema-00.xsd");
    }

    #[test]
    fn test_query_pages_partition_the_match_set() {
        let (store, _) = seeded_store();
        let query = parse("/s-ramp/xsd").unwrap();

        let full = store.query(&query, &QueryOptions::default()).unwrap();
        let mut paged = Vec::new();
        for page in 0..4 {
            let params = QueryParams::for_expression("/s-ramp/xsd").with_offset(page * 3, 3);
            let options = QueryOptions::from_params(&params);
            let result = store.query(&query, &options).unwrap();
            assert_eq!(result.total_count, 10);
            paged.extend(result.rows);
        }
        assert_eq!(paged, full.rows);
    }

    #[test]
    fn test_query_repeated_calls_identical() {
        let (store, _) = seeded_store();
        let query = parse("/s-ramp/xsd[@rank != 3]").unwrap();
        let params = QueryParams::for_expression("x").with_offset(2, 4);
        let options = QueryOptions::from_params(&params);

        let first = store.query(&query, &options).unwrap();
        let second = store.query(&query, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_query_offset_beyond_matches_is_empty() {
        let (store, _) = seeded_store();
        let query = parse("/s-ramp/xsd").unwrap();
        let params = QueryParams::for_expression("x").with_offset(50, 10);
        let result = store
            .query(&query, &QueryOptions::from_params(&params))
            .unwrap();
        assert_eq!(result.total_count, 10);
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_query_projects_requested_properties() {
        let (store, _) = seeded_store();
        let query = parse("/s-ramp/xsd").unwrap();
        let params = QueryParams::for_expression("x")
            .with_projected_property("rank")
            .with_projected_property("absent");
        let result = store
            .query(&query, &QueryOptions::from_params(&params))
            .unwrap();

        for row in &result.rows {
            assert!(row.properties.contains_key("rank"));
            assert!(!row.properties.contains_key("absent"));
        }
    }

    #[test]
    fn test_query_predicate_filters_rows() {
        let (store, _) = seeded_store();
        let query = parse("/s-ramp/xsd[@rank = '4']").unwrap();
        let result = store.query(&query, &QueryOptions::default()).unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.rows[0].name, "schema-04.xsd");
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
