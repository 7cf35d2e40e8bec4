//! The artifact record and its relationships.

use crate::identity::{ArtifactId, ContentHash, Timestamp};
use crate::types::ArtifactType;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Kind of a typed reference between artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// Links a derived child back to the compound parent that produced it.
    DerivedFrom,
    /// Any other user-defined relationship type.
    Other(String),
}

/// Typed reference to another artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub target: ArtifactId,
}

/// The persisted artifact entity: metadata plus an optional binary payload
/// tracked by size and hash (the payload itself lives in the backend's
/// content store).
///
/// `uuid` is nil until the backend assigns one on first persist and is
/// immutable afterwards. `version` is the optimistic stamp compared on
/// metadata updates; a stale stamp loses with a version conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub uuid: ArtifactId,
    pub name: String,
    pub description: Option<String>,
    pub artifact_type: ArtifactType,
    pub content_size: Option<i64>,
    pub content_hash: Option<ContentHash>,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    pub version: i64,
    pub properties: BTreeMap<String, String>,
    pub relationships: Vec<Relationship>,
}

impl Artifact {
    /// Create a new, not-yet-persisted record of the given type. The name
    /// defaults to the kind's synthetic file name until overridden.
    pub fn new(artifact_type: ArtifactType) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::nil(),
            name: artifact_type.kind.default_file_name(),
            description: None,
            artifact_type,
            content_size: None,
            content_hash: None,
            created_at: now,
            modified_at: now,
            version: 0,
            properties: BTreeMap::new(),
            relationships: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Add a custom property.
    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    /// Add a relationship.
    pub fn with_relationship(mut self, kind: RelationshipKind, target: ArtifactId) -> Self {
        self.relationships.push(Relationship { kind, target });
        self
    }

    /// Whether the backend has assigned a uuid yet.
    pub fn is_persisted(&self) -> bool {
        !self.uuid.is_nil()
    }

    /// The owning parent, when this artifact was produced by expansion.
    pub fn derived_from(&self) -> Option<ArtifactId> {
        self.relationships
            .iter()
            .find(|r| r.kind == RelationshipKind::DerivedFrom)
            .map(|r| r.target)
    }

    /// Look up an attribute or custom property by the name used in query
    /// expressions. Built-in attributes shadow custom properties.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "uuid" => Some(self.uuid.to_string()),
            "name" => Some(self.name.clone()),
            "description" => self.description.clone(),
            "contentType" => Some(self.artifact_type.mime_type.clone()),
            "createdTimestamp" => Some(self.created_at.to_rfc3339()),
            "lastModifiedTimestamp" => Some(self.modified_at.to_rfc3339()),
            _ => self.properties.get(name).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArtifactKind;

    fn doc() -> Artifact {
        Artifact::new(ArtifactType::new(ArtifactKind::XmlDocument))
    }

    #[test]
    fn test_new_artifact_is_unpersisted_with_default_name() {
        let a = doc();
        assert!(!a.is_persisted());
        assert_eq!(a.name, "newartifact.xml");
        assert_eq!(a.version, 0);
        assert!(a.content_size.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let parent = crate::new_artifact_id();
        let a = doc()
            .with_name("order.xml")
            .with_description("order schema instance")
            .with_property("project", "orders")
            .with_relationship(RelationshipKind::DerivedFrom, parent);

        assert_eq!(a.name, "order.xml");
        assert_eq!(a.description.as_deref(), Some("order schema instance"));
        assert_eq!(a.properties.get("project").map(String::as_str), Some("orders"));
        assert_eq!(a.derived_from(), Some(parent));
    }

    #[test]
    fn test_derived_from_absent_without_relationship() {
        let a = doc().with_relationship(
            RelationshipKind::Other("documentation".to_string()),
            crate::new_artifact_id(),
        );
        assert_eq!(a.derived_from(), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let artifact = doc()
            .with_name("order.xml")
            .with_property("project", "orders")
            .with_relationship(RelationshipKind::DerivedFrom, crate::new_artifact_id());

        let json = serde_json::to_string(&artifact).unwrap();
        let back: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
    }

    #[test]
    fn test_attribute_lookup() {
        let a = doc().with_name("order.xml").with_property("project", "orders");
        assert_eq!(a.attribute("name").as_deref(), Some("order.xml"));
        assert_eq!(a.attribute("project").as_deref(), Some("orders"));
        assert_eq!(a.attribute("contentType").as_deref(), Some("application/xml"));
        assert_eq!(a.attribute("missing"), None);
    }
}
