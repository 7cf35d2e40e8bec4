//! Test utilities and fixtures shared by the workspace's test suites.

use flate2::write::GzEncoder;
use flate2::Compression;
use sramp_core::{Artifact, ArtifactKind, ArtifactType};
use sramp_storage::{ContentSource, InMemoryBackend, PersistenceBackend};
use std::io::Write;

/// An unpersisted core XML document record.
pub fn xml_document(name: &str) -> Artifact {
    Artifact::new(ArtifactType::new(ArtifactKind::XmlDocument)).with_name(name)
}

/// An unpersisted XSD schema record.
pub fn xsd_document(name: &str) -> Artifact {
    Artifact::new(ArtifactType::new(ArtifactKind::XsdDocument)).with_name(name)
}

/// An unpersisted opaque document record.
pub fn document(name: &str) -> Artifact {
    Artifact::new(ArtifactType::new(ArtifactKind::Document)).with_name(name)
}

/// An unpersisted compound (tar) document record.
pub fn compound_document(name: &str) -> Artifact {
    Artifact::new(ArtifactType::new(ArtifactKind::Document).with_mime_type("application/x-tar"))
        .with_name(name)
}

/// Build an in-memory tar archive from (path, content) pairs.
pub fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, *content)
            .expect("append tar entry");
    }
    builder.into_inner().expect("finish tar")
}

/// Gzip a payload, for `.tar.gz` fixtures.
pub fn gzip_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Backend pre-populated with `n` XSD schemas named `schema-00.xsd`,
/// `schema-01.xsd`, ... each carrying a `rank` property.
pub fn seeded_backend(n: usize) -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    for i in 0..n {
        let artifact = xsd_document(&format!("schema-{:02}.xsd", i)).with_property("rank", &i.to_string());
        backend
            .persist(
                artifact,
                Some(ContentSource::from_bytes(format!("<xsd id=\"{}\"/>", i).into_bytes())),
            )
            .expect("seed artifact");
    }
    backend
}
