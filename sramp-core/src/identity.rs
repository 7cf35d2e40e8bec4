//! Identity types for repository entities

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Artifact identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, so the default query ordering by uuid
/// follows creation order.
pub type ArtifactId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// SHA-256 content hash recorded alongside stored payloads.
pub type ContentHash = [u8; 32];

/// Raw binary content.
pub type RawContent = Vec<u8>;

/// Generate a new UUIDv7 ArtifactId (timestamp-sortable).
pub fn new_artifact_id() -> ArtifactId {
    Uuid::now_v7()
}

/// Compute SHA-256 hash of content.
pub fn compute_content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}
