//! Query, paging, and result-row parameter types.

use crate::artifact::Artifact;
use crate::identity::{ArtifactId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Page size applied when a caller supplies neither a count nor an offset
/// convention of their own.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Externally supplied query parameters, before normalization.
///
/// Callers either give a zero-based `start_index` directly or a 1-based
/// `start_page`; when both are present the explicit index wins and the page
/// number is ignored, so the conversion is never applied twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub expression: Option<String>,
    pub start_index: Option<u32>,
    pub start_page: Option<u32>,
    pub count: Option<u32>,
    pub order_by: Option<String>,
    pub ascending: Option<bool>,
    pub projected_properties: BTreeSet<String>,
}

impl QueryParams {
    /// Parameters for the given expression, everything else defaulted.
    pub fn for_expression(expression: &str) -> Self {
        Self {
            expression: Some(expression.to_string()),
            ..Self::default()
        }
    }

    /// Set the 1-based page and page size.
    pub fn with_page(mut self, page: u32, count: u32) -> Self {
        self.start_page = Some(page);
        self.count = Some(count);
        self
    }

    /// Set the zero-based offset and page size.
    pub fn with_offset(mut self, start_index: u32, count: u32) -> Self {
        self.start_index = Some(start_index);
        self.count = Some(count);
        self
    }

    /// Set the sort key and direction.
    pub fn with_order(mut self, order_by: &str, ascending: bool) -> Self {
        self.order_by = Some(order_by.to_string());
        self.ascending = Some(ascending);
        self
    }

    /// Request an extra property in each result row.
    pub fn with_projected_property(mut self, name: &str) -> Self {
        self.projected_properties.insert(name.to_string());
        self
    }

    /// Resolve the paging convention into a canonical offset + limit.
    pub fn resolve_paging(&self) -> Paging {
        let count = self.count.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let start_index = match (self.start_index, self.start_page) {
            (Some(index), _) => index,
            (None, Some(page)) => page.saturating_sub(1).saturating_mul(count),
            (None, None) => 0,
        };
        Paging { start_index, count }
    }
}

/// Canonical zero-based offset + positive limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub start_index: u32,
    pub count: u32,
}

/// Normalized options handed to the backend alongside a parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub paging: Paging,
    pub order_by: Option<String>,
    pub ascending: bool,
    pub projected_properties: BTreeSet<String>,
}

impl QueryOptions {
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            paging: params.resolve_paging(),
            order_by: params.order_by.clone(),
            ascending: params.ascending.unwrap_or(true),
            projected_properties: params.projected_properties.clone(),
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            paging: Paging {
                start_index: 0,
                count: DEFAULT_PAGE_SIZE,
            },
            order_by: None,
            ascending: true,
            projected_properties: BTreeSet::new(),
        }
    }
}

/// One row of a query result: the artifact's summary attributes plus the
/// values of any projected properties present on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub uuid: ArtifactId,
    pub name: String,
    pub model: String,
    pub type_name: String,
    pub mime_type: String,
    pub content_size: Option<i64>,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    /// Projected property values; a property absent on this artifact is
    /// simply not a key here.
    pub properties: BTreeMap<String, String>,
}

impl ArtifactSummary {
    /// Summarize an artifact, projecting the requested property values that
    /// exist on it.
    pub fn of(artifact: &Artifact, projected: &BTreeSet<String>) -> Self {
        let mut properties = BTreeMap::new();
        for name in projected {
            if let Some(value) = artifact.properties.get(name) {
                properties.insert(name.clone(), value.clone());
            }
        }
        Self {
            uuid: artifact.uuid,
            name: artifact.name.clone(),
            model: artifact.artifact_type.kind.model().to_string(),
            type_name: artifact.artifact_type.kind.type_name().to_string(),
            mime_type: artifact.artifact_type.mime_type.clone(),
            content_size: artifact.content_size,
            created_at: artifact.created_at,
            modified_at: artifact.modified_at,
            properties,
        }
    }
}

/// Ordered, bounded query result plus the total match count before paging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResultSet {
    pub total_count: u64,
    pub rows: Vec<ArtifactSummary>,
}

// =============================================================================
// TESTS
// =============================================================================
