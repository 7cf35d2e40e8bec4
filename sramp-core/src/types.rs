//! Artifact type system: kind classification, type descriptors, MIME resolution.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The generic placeholder content type. A request header carrying this value
/// does not win MIME resolution; it falls through to extension inference.
pub const GENERIC_MIME: &str = "application/octet-stream";

// ============================================================================
// ARTIFACT KIND
// ============================================================================

/// Closed classification of every artifact kind the repository understands.
///
/// Kinds marked derived can only be produced by expanding a compound parent;
/// a direct create of a derived kind is rejected by the persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    // core model
    /// Opaque binary document
    Document,
    /// Well-formed XML document
    XmlDocument,
    // xsd model
    XsdDocument,
    ElementDeclaration,
    AttributeDeclaration,
    SimpleTypeDeclaration,
    ComplexTypeDeclaration,
    // wsdl model
    WsdlDocument,
    Message,
    PortType,
    WsdlOperation,
    Binding,
    WsdlService,
    // policy model
    PolicyDocument,
    /// User-defined type in the "ext" model, identified by its type name.
    Extended(String),
}

impl ArtifactKind {
    /// Resolve a (model, type) pair into a kind.
    pub fn resolve(model: &str, type_name: &str) -> Result<Self, TypeError> {
        let unknown = || TypeError::UnknownType {
            model: model.to_string(),
            type_name: type_name.to_string(),
        };
        match model {
            "core" => match type_name {
                "Document" => Ok(ArtifactKind::Document),
                "XmlDocument" => Ok(ArtifactKind::XmlDocument),
                _ => Err(unknown()),
            },
            "xsd" => match type_name {
                "XsdDocument" => Ok(ArtifactKind::XsdDocument),
                "ElementDeclaration" => Ok(ArtifactKind::ElementDeclaration),
                "AttributeDeclaration" => Ok(ArtifactKind::AttributeDeclaration),
                "SimpleTypeDeclaration" => Ok(ArtifactKind::SimpleTypeDeclaration),
                "ComplexTypeDeclaration" => Ok(ArtifactKind::ComplexTypeDeclaration),
                _ => Err(unknown()),
            },
            "wsdl" => match type_name {
                "WsdlDocument" => Ok(ArtifactKind::WsdlDocument),
                "Message" => Ok(ArtifactKind::Message),
                "PortType" => Ok(ArtifactKind::PortType),
                "Operation" => Ok(ArtifactKind::WsdlOperation),
                "Binding" => Ok(ArtifactKind::Binding),
                "Service" => Ok(ArtifactKind::WsdlService),
                _ => Err(unknown()),
            },
            "policy" => match type_name {
                "PolicyDocument" => Ok(ArtifactKind::PolicyDocument),
                _ => Err(unknown()),
            },
            "ext" => {
                if type_name.is_empty() {
                    Err(unknown())
                } else {
                    Ok(ArtifactKind::Extended(type_name.to_string()))
                }
            }
            _ => Err(unknown()),
        }
    }

    /// Infer a kind from a file or archive-entry name, by extension.
    /// Unknown extensions classify as an opaque core Document.
    pub fn from_file_name(file_name: &str) -> Self {
        match extension_of(file_name) {
            Some("xml") => ArtifactKind::XmlDocument,
            Some("xsd") => ArtifactKind::XsdDocument,
            Some("wsdl") => ArtifactKind::WsdlDocument,
            _ => ArtifactKind::Document,
        }
    }

    /// The model (namespace) this kind belongs to.
    pub fn model(&self) -> &'static str {
        match self {
            ArtifactKind::Document | ArtifactKind::XmlDocument => "core",
            ArtifactKind::XsdDocument
            | ArtifactKind::ElementDeclaration
            | ArtifactKind::AttributeDeclaration
            | ArtifactKind::SimpleTypeDeclaration
            | ArtifactKind::ComplexTypeDeclaration => "xsd",
            ArtifactKind::WsdlDocument
            | ArtifactKind::Message
            | ArtifactKind::PortType
            | ArtifactKind::WsdlOperation
            | ArtifactKind::Binding
            | ArtifactKind::WsdlService => "wsdl",
            ArtifactKind::PolicyDocument => "policy",
            ArtifactKind::Extended(_) => "ext",
        }
    }

    /// The leaf type name within the model.
    pub fn type_name(&self) -> &str {
        match self {
            ArtifactKind::Document => "Document",
            ArtifactKind::XmlDocument => "XmlDocument",
            ArtifactKind::XsdDocument => "XsdDocument",
            ArtifactKind::ElementDeclaration => "ElementDeclaration",
            ArtifactKind::AttributeDeclaration => "AttributeDeclaration",
            ArtifactKind::SimpleTypeDeclaration => "SimpleTypeDeclaration",
            ArtifactKind::ComplexTypeDeclaration => "ComplexTypeDeclaration",
            ArtifactKind::WsdlDocument => "WsdlDocument",
            ArtifactKind::Message => "Message",
            ArtifactKind::PortType => "PortType",
            ArtifactKind::WsdlOperation => "Operation",
            ArtifactKind::Binding => "Binding",
            ArtifactKind::WsdlService => "Service",
            ArtifactKind::PolicyDocument => "PolicyDocument",
            ArtifactKind::Extended(name) => name,
        }
    }

    /// Whether this kind can only be produced by expansion, never by a
    /// direct client create.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            ArtifactKind::ElementDeclaration
                | ArtifactKind::AttributeDeclaration
                | ArtifactKind::SimpleTypeDeclaration
                | ArtifactKind::ComplexTypeDeclaration
                | ArtifactKind::Message
                | ArtifactKind::PortType
                | ArtifactKind::WsdlOperation
                | ArtifactKind::Binding
                | ArtifactKind::WsdlService
        )
    }

    /// Default MIME type when neither the request header nor the file name
    /// says otherwise.
    pub fn default_mime_type(&self) -> &'static str {
        match self {
            ArtifactKind::Document | ArtifactKind::Extended(_) => GENERIC_MIME,
            _ => "application/xml",
        }
    }

    /// Default file extension for this kind.
    pub fn default_extension(&self) -> &'static str {
        match self {
            ArtifactKind::Document | ArtifactKind::Extended(_) => "bin",
            ArtifactKind::XsdDocument => "xsd",
            ArtifactKind::WsdlDocument => "wsdl",
            _ => "xml",
        }
    }

    /// Synthetic display name used when a create request carries no name.
    pub fn default_file_name(&self) -> String {
        match self {
            ArtifactKind::Document => "newartifact.bin".to_string(),
            ArtifactKind::XmlDocument => "newartifact.xml".to_string(),
            _ => format!("newartifact.{}", self.model()),
        }
    }
}

impl fmt::Display for ArtifactKind {
    /// Writes the `model/Type` path form used in query expressions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model(), self.type_name())
    }
}

// ============================================================================
// ARTIFACT TYPE DESCRIPTOR
// ============================================================================

/// Request-time type descriptor: the classified kind plus the MIME type
/// resolved for this particular request or stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactType {
    pub kind: ArtifactKind,
    pub mime_type: String,
}

impl ArtifactType {
    /// Descriptor with the kind's default MIME type.
    pub fn new(kind: ArtifactKind) -> Self {
        let mime_type = kind.default_mime_type().to_string();
        Self { kind, mime_type }
    }

    /// Resolve a (model, type) pair into a descriptor.
    pub fn resolve(model: &str, type_name: &str) -> Result<Self, TypeError> {
        Ok(Self::new(ArtifactKind::resolve(model, type_name)?))
    }

    /// Infer the descriptor from an already-materialized artifact's
    /// discriminator, keeping its stored MIME type.
    pub fn for_artifact(artifact: &crate::artifact::Artifact) -> Self {
        artifact.artifact_type.clone()
    }

    /// Override the resolved MIME type.
    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = mime_type.to_string();
        self
    }

    /// Whether the stored MIME type marks compound (archive) content that
    /// the expander knows how to open.
    pub fn is_compound(&self) -> bool {
        matches!(self.mime_type.as_str(), "application/x-tar" | "application/gzip")
    }
}

// ============================================================================
// MIME RESOLUTION
// ============================================================================

/// Map a file extension to a MIME type, if known.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "xml" | "xsd" | "wsdl" => Some("application/xml"),
        "json" => Some("application/json"),
        "txt" => Some("text/plain"),
        "html" | "htm" => Some("text/html"),
        "pdf" => Some("application/pdf"),
        "zip" | "jar" => Some("application/zip"),
        "tar" => Some("application/x-tar"),
        "gz" | "tgz" => Some("application/gzip"),
        "bin" => Some(GENERIC_MIME),
        _ => None,
    }
}

/// Determine the MIME type for an incoming artifact.
///
/// Resolution order is fixed: an explicit, non-generic content-type header
/// wins; otherwise the file extension is consulted; otherwise the kind's
/// default applies.
pub fn determine_mime_type(
    content_type: Option<&str>,
    file_name: Option<&str>,
    kind: &ArtifactKind,
) -> String {
    if let Some(header) = content_type {
        let header = header.trim();
        if !header.is_empty() && header != GENERIC_MIME {
            return header.to_string();
        }
    }
    if let Some(name) = file_name {
        if let Some(mime) = extension_of(name).and_then(mime_for_extension) {
            return mime.to_string();
        }
    }
    kind.default_mime_type().to_string()
}

fn extension_of(file_name: &str) -> Option<&str> {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================
