//! Query operations: normalize parameters, delegate matching to the backend.

use sramp_core::{
    QueryError, QueryOptions, QueryParams, QueryResultSet, RepositoryConfig, SrampResult,
    DEFAULT_PAGE_SIZE,
};
use sramp_query::{normalize, parse};
use sramp_storage::PersistenceBackend;
use std::sync::Arc;

/// Query evaluation over the located backend.
///
/// A pure transformation plus one delegated call: paging resolution
/// (including the 1-based page-number conversion), expression normalization,
/// parse, delegate. No state is held between calls, so concurrent use needs
/// no coordination.
pub struct QueryService {
    backend: Arc<dyn PersistenceBackend>,
    default_page_size: u32,
}

impl QueryService {
    pub fn new(backend: Arc<dyn PersistenceBackend>) -> Self {
        Self {
            backend,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_config(backend: Arc<dyn PersistenceBackend>, config: &RepositoryConfig) -> Self {
        Self {
            backend,
            default_page_size: config.default_page_size,
        }
    }

    /// Evaluate a query.
    ///
    /// Fails with `MissingQuery` when no expression was supplied. The
    /// backend is the single source of truth for matching and ordering.
    pub fn query(&self, params: &QueryParams) -> SrampResult<QueryResultSet> {
        let expression = params
            .expression
            .as_deref()
            .ok_or(QueryError::MissingQuery)?;
        let normalized = normalize(expression)?;
        let parsed = parse(&normalized).map_err(QueryError::from)?;

        let mut effective = params.clone();
        if effective.count.is_none() {
            effective.count = Some(self.default_page_size);
        }
        let options = QueryOptions::from_params(&effective);

        tracing::debug!(
            expression = %normalized,
            start_index = options.paging.start_index,
            count = options.paging.count,
            "executing query"
        );
        self.backend.query(&parsed, &options)
    }
}

// =============================================================================
// TESTS
// =============================================================================
