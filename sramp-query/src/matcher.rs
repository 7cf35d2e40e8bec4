//! Match engine: evaluate a parsed query against an artifact.

use crate::parser::{Clause, CompareOp, Literal, Query};
use sramp_core::Artifact;

/// Whether the artifact satisfies the query's model/type selection and every
/// predicate clause.
pub fn matches(query: &Query, artifact: &Artifact) -> bool {
    if let Some(model) = &query.model {
        if artifact.artifact_type.kind.model() != model {
            return false;
        }
    }
    if let Some(type_name) = &query.type_name {
        if artifact.artifact_type.kind.type_name() != type_name {
            return false;
        }
    }
    query.predicate.iter().all(|c| clause_matches(c, artifact))
}

fn clause_matches(clause: &Clause, artifact: &Artifact) -> bool {
    match clause {
        Clause::Exists { property } => artifact.attribute(property).is_some(),
        Clause::Compare {
            property,
            op,
            value,
        } => {
            // An absent attribute satisfies neither = nor !=.
            let Some(actual) = artifact.attribute(property) else {
                return false;
            };
            let equal = literal_equals(value, &actual);
            match op {
                CompareOp::Eq => equal,
                CompareOp::Ne => !equal,
            }
        }
    }
}

fn literal_equals(literal: &Literal, actual: &str) -> bool {
    match literal {
        Literal::Str(expected) => actual == expected,
        // Numeric comparison: the stored value must parse as a number.
        Literal::Number(expected) => actual.parse::<f64>() == Ok(*expected),
    }
}

// =============================================================================
// TESTS
// =============================================================================
