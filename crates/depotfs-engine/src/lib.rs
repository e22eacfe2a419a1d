#![warn(missing_docs)]

//! DepotFS engine: directory tree materialization and introspection.
//!
//! This crate implements the core of the DepotFS file service. The
//! materializer reproduces a client-submitted directory tree on disk from a
//! bag of uploaded payloads, collecting per-node errors instead of aborting;
//! the introspector reports the immediate contents of an on-disk directory.
//! All I/O is synchronous `std::fs`; callers decide how to schedule it.

pub mod blobs;
pub mod error;
pub mod introspect;
pub mod materialize;
pub mod tree;

pub use blobs::{BlobSource, BlobTable, MemoryBlob};
pub use error::{EngineError, EngineResult};
pub use introspect::introspect;
pub use materialize::{materialize, MaterializeReport};
pub use tree::{DirectoryEntry, DirectoryListing, NodeKind, TreeError, TreeNode};
