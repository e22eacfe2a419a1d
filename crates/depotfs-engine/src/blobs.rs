//! Per-request lookup table for uploaded file payloads.
//!
//! The table is built once from the decoded upload, before traversal
//! begins, and treated as read-only while the materializer runs. Nothing in
//! it survives the request.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};

use bytes::Bytes;

/// A readable byte source with a declared size.
pub trait BlobSource: Send + Sync {
    /// Declared payload size in bytes.
    fn size(&self) -> u64;

    /// Opens a fresh reader over the payload.
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;
}

/// An uploaded payload buffered in memory.
#[derive(Debug, Clone)]
pub struct MemoryBlob {
    data: Bytes,
}

impl MemoryBlob {
    /// Wraps an already-buffered payload.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl BlobSource for MemoryBlob {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.data.clone())))
    }
}

/// Mapping from a client-chosen reference to its uploaded payload.
///
/// References are unique per request; if several tree nodes point at the
/// same reference they all receive the same payload.
#[derive(Default)]
pub struct BlobTable {
    entries: HashMap<String, Box<dyn BlobSource>>,
}

impl BlobTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload under `client_ref`, replacing any previous one.
    pub fn insert(&mut self, client_ref: impl Into<String>, source: Box<dyn BlobSource>) {
        self.entries.insert(client_ref.into(), source);
    }

    /// Looks up a payload by reference.
    pub fn get(&self, client_ref: &str) -> Option<&dyn BlobSource> {
        self.entries.get(client_ref).map(|b| b.as_ref())
    }

    /// Number of registered payloads.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no payloads are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
