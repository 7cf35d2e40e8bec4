//! SRAMP Core - Entity Types
//!
//! Pure data types for the artifact repository. All other crates depend on
//! this one: identifiers, the artifact model and type system, the error
//! taxonomy, query parameters, and repository configuration.

pub mod artifact;
pub mod config;
pub mod error;
pub mod identity;
pub mod params;
pub mod types;

pub use artifact::{Artifact, Relationship, RelationshipKind};
pub use config::RepositoryConfig;
pub use error::{
    ConfigError, EntryFailure, ExpandError, ExpansionReport, QueryError, SrampError, SrampResult,
    StorageError, TypeError,
};
pub use identity::{
    compute_content_hash, new_artifact_id, ArtifactId, ContentHash, RawContent, Timestamp,
};
pub use params::{
    ArtifactSummary, Paging, QueryOptions, QueryParams, QueryResultSet, DEFAULT_PAGE_SIZE,
};
pub use types::{determine_mime_type, mime_for_extension, ArtifactKind, ArtifactType, GENERIC_MIME};
