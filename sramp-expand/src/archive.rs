//! Compound-content readers.
//!
//! An [`ArchiveReader`] walks the inner entries of a compound payload once,
//! in archive order, surfacing each entry either as data or as a per-entry
//! failure so one bad entry never hides the rest.

use flate2::read::GzDecoder;
use sramp_core::{EntryFailure, ExpandError, RawContent, SrampResult};
use std::io::Read;

/// One inner entry of a compound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path of the entry inside the archive.
    pub path: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    pub content: RawContent,
}

/// Reader contract for compound content.
///
/// `read_entries` is a single pass: the underlying stream is consumed and a
/// second call has nothing left to yield. Entries come back in archive
/// order; a malformed entry occupies its slot as an `Err` and the walk
/// continues. Only a payload that cannot be opened at all fails the call.
pub trait ArchiveReader: Send {
    fn read_entries(&mut self) -> SrampResult<Vec<Result<ArchiveEntry, EntryFailure>>>;
}

/// Tar reader, with transparent gzip decompression for `.tar.gz`/`.tgz`
/// payloads (selected by the compound artifact's file name).
pub struct TarArchiveReader {
    source: Option<Box<dyn Read + Send>>,
    gzipped: bool,
}

impl TarArchiveReader {
    /// Reader over a raw tar stream.
    pub fn new(source: impl Read + Send + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            gzipped: false,
        }
    }

    /// Reader over a gzip-compressed tar stream.
    pub fn new_gzipped(source: impl Read + Send + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            gzipped: true,
        }
    }

    /// Pick plain or gzipped reading from the compound file name.
    pub fn for_file_name(source: impl Read + Send + 'static, file_name: &str) -> Self {
        let lowered = file_name.to_ascii_lowercase();
        if lowered.ends_with(".tar.gz") || lowered.ends_with(".tgz") || lowered.ends_with(".gz") {
            Self::new_gzipped(source)
        } else {
            Self::new(source)
        }
    }
}

impl ArchiveReader for TarArchiveReader {
    fn read_entries(&mut self) -> SrampResult<Vec<Result<ArchiveEntry, EntryFailure>>> {
        let source = self.source.take().ok_or_else(|| ExpandError::Archive {
            reason: "archive stream already consumed".to_string(),
        })?;
        let reader: Box<dyn Read> = if self.gzipped {
            Box::new(GzDecoder::new(source))
        } else {
            source
        };

        let mut archive = tar::Archive::new(reader);
        let entries = archive.entries().map_err(|e| ExpandError::Archive {
            reason: format!("failed to open archive: {}", e),
        })?;

        let mut outcomes = Vec::new();
        for (index, entry_result) in entries.enumerate() {
            let mut entry = match entry_result {
                Ok(entry) => entry,
                // A failure on the very first header means the payload is
                // not an archive at all; past that point tar cannot resync,
                // so the failure is recorded per-entry and iteration ends.
                Err(e) if index == 0 => {
                    return Err(ExpandError::Archive {
                        reason: format!("failed to read archive: {}", e),
                    }
                    .into());
                }
                Err(e) => {
                    outcomes.push(Err(EntryFailure {
                        entry_path: format!("entry-{}", index),
                        reason: format!("unreadable entry header: {}", e),
                    }));
                    continue;
                }
            };

            let path = match entry.path() {
                Ok(path) => path.to_string_lossy().to_string(),
                Err(e) => {
                    outcomes.push(Err(EntryFailure {
                        entry_path: format!("entry-{}", index),
                        reason: format!("invalid entry path: {}", e),
                    }));
                    continue;
                }
            };

            // Only regular files become artifacts; directory and link
            // entries are structural.
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let declared = entry.header().size().unwrap_or(0);
            let mut content = Vec::new();
            match entry.read_to_end(&mut content) {
                Ok(_) if content.len() as u64 == declared => outcomes.push(Ok(ArchiveEntry {
                    path,
                    size: declared,
                    content,
                })),
                Ok(read) => outcomes.push(Err(EntryFailure {
                    entry_path: path,
                    reason: format!("truncated entry: declared {} bytes, read {}", declared, read),
                })),
                Err(e) => outcomes.push(Err(EntryFailure {
                    entry_path: path,
                    reason: format!("failed to read entry: {}", e),
                })),
            }
        }
        Ok(outcomes)
    }
}

// =============================================================================
// TESTS
// =============================================================================
