//! Error taxonomy for repository operations.
//!
//! Every failure an operation can surface is one of these kinds. At a wire
//! boundary, type/query/invalid-operation errors map to bad-request
//! responses, `NotFound` to not-found, `VersionConflict` to a conflict
//! response inviting retry, and `NoProviderConfigured` aborts startup.

use crate::identity::ArtifactId;
use thiserror::Error;

/// Artifact type resolution errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("Unknown artifact type: {model}/{type_name}")]
    UnknownType { model: String, type_name: String },
}

/// Persistence backend errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Artifact not found: {type_name} with uuid {uuid}")]
    NotFound { uuid: ArtifactId, type_name: String },

    #[error("Version conflict on {uuid}: expected version {expected}, found {actual}")]
    VersionConflict {
        uuid: ArtifactId,
        expected: i64,
        actual: i64,
    },

    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },

    #[error("Content I/O failed: {reason}")]
    Io { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Query evaluation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Missing query expression")]
    MissingQuery,

    #[error("Query parse error at offset {position}: {message}")]
    Parse { message: String, position: usize },
}

/// A single failed entry recorded during expansion of compound content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub entry_path: String,
    pub reason: String,
}

/// Per-entry failure report carried by a partial expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionReport {
    pub failures: Vec<EntryFailure>,
}

impl ExpansionReport {
    pub fn record(&mut self, entry_path: &str, reason: &str) {
        self.failures.push(EntryFailure {
            entry_path: entry_path.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Derived-artifact expansion errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpandError {
    /// Some entries could not be processed; the ones that could are already
    /// persisted. The report lists exactly the entries that failed.
    #[error("Expansion completed with {} failed entries", report.failures.len())]
    Partial { report: ExpansionReport },

    #[error("Unreadable compound content: {reason}")]
    Archive { reason: String },
}

/// Configuration and provider wiring errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Fatal startup error: no provider was registered for the concern.
    #[error("No {concern} provider configured")]
    NoProviderConfigured { concern: String },

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Master error type for all repository operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SrampError {
    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Expansion error: {0}")]
    Expand(#[from] ExpandError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for repository operations.
pub type SrampResult<T> = Result<T, SrampError>;

// =============================================================================
// TESTS
// =============================================================================
