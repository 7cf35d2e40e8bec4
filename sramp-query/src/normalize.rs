//! Expression normalization: rooting bare fragments at the namespace marker.

use sramp_core::QueryError;

/// Top-level namespace marker every query is rooted under.
pub const QUERY_ROOT: &str = "/s-ramp";

/// Root an expression at [`QUERY_ROOT`].
///
/// Already-rooted expressions pass through unchanged, which makes this
/// idempotent. A fragment beginning with `/` is rooted directly under the
/// marker; anything else is joined with a separating `/`. Blank expressions
/// cannot be evaluated and fail with `MissingQuery`.
pub fn normalize(expression: &str) -> Result<String, QueryError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(QueryError::MissingQuery);
    }
    if expression.starts_with(QUERY_ROOT) {
        Ok(expression.to_string())
    } else if expression.starts_with('/') {
        Ok(format!("{}{}", QUERY_ROOT, expression))
    } else {
        Ok(format!("{}/{}", QUERY_ROOT, expression))
    }
}

// =============================================================================
// TESTS
// =============================================================================
