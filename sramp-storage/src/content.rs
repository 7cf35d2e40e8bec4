//! Content streaming types.
//!
//! Inbound payloads arrive as a [`ContentSource`]; outbound reads hand back a
//! [`ContentStream`] whose underlying resource is released on every exit
//! path, drained or aborted.

use sha2::{Digest, Sha256};
use sramp_core::{ContentHash, RawContent};
use std::io::{self, Read};

/// Chunk size used when draining inbound content.
const CHUNK_SIZE: usize = 8 * 1024;

/// An inbound, single-pass content payload.
pub struct ContentSource {
    reader: Box<dyn Read + Send>,
}

impl ContentSource {
    /// Wrap an arbitrary reader.
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// A source over an in-memory payload.
    pub fn from_bytes(bytes: impl Into<RawContent>) -> Self {
        Self::new(io::Cursor::new(bytes.into()))
    }

    /// Drain the source in chunks, hashing as it goes.
    /// Returns the collected bytes, the byte count, and the SHA-256 hash.
    pub fn drain(mut self) -> io::Result<(RawContent, i64, ContentHash)> {
        let mut collected = Vec::new();
        let mut hasher = Sha256::new();
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            let n = self.reader.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            hasher.update(&chunk[..n]);
            collected.extend_from_slice(&chunk[..n]);
        }
        let size = collected.len() as i64;
        let digest = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        Ok((collected, size, hash))
    }
}

impl Read for ContentSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl std::fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentSource").finish_non_exhaustive()
    }
}

/// An outbound, lazy, single-pass content stream.
///
/// The release hook runs exactly once, when the stream is dropped - whether
/// the caller drained it fully, stopped early, or hit an error.
pub struct ContentStream {
    reader: Box<dyn Read + Send>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ContentStream {
    /// Stream from a reader with a release hook.
    pub fn new(reader: impl Read + Send + 'static, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            release: Some(Box::new(release)),
        }
    }

    /// Drain the remaining bytes into a buffer.
    pub fn read_all(mut self) -> io::Result<RawContent> {
        let mut bytes = Vec::new();
        self.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl Read for ContentStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Drop for ContentStream {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStream").finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sramp_core::compute_content_hash;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_drain_collects_size_and_hash() {
        let payload = b"hello artifact content".to_vec();
        let source = ContentSource::from_bytes(payload.clone());
        let (bytes, size, hash) = source.drain().unwrap();
        assert_eq!(bytes, payload);
        assert_eq!(size, payload.len() as i64);
        assert_eq!(hash, compute_content_hash(&payload));
    }

    #[test]
    fn test_drain_handles_payloads_larger_than_one_chunk() {
        let payload = vec![7u8; CHUNK_SIZE * 3 + 17];
        let (bytes, size, hash) = ContentSource::from_bytes(payload.clone()).drain().unwrap();
        assert_eq!(bytes.len(), payload.len());
        assert_eq!(size, payload.len() as i64);
        assert_eq!(hash, compute_content_hash(&payload));
        assert_eq!(bytes, payload);
    }

    #[test]
    fn test_stream_release_runs_after_full_drain() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let stream = ContentStream::new(io::Cursor::new(b"data".to_vec()), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let bytes = stream.read_all().unwrap();
        assert_eq!(bytes, b"data");
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stream_release_runs_on_early_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let mut stream = ContentStream::new(io::Cursor::new(vec![0u8; 1024]), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut partial = [0u8; 16];
        stream.read(&mut partial).unwrap();
        drop(stream);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
