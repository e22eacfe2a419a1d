//! Error types for the engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error variants for materialization and introspection.
///
/// Per-node failures during materialization are not represented here; they
/// are collected into the [`crate::materialize::MaterializeReport`] so that
/// traversal can continue on unaffected branches.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The destination root for a materialization does not exist or is not
    /// a directory.
    #[error("destination root {} does not exist or is not a directory", .path.display())]
    DestinationMissing {
        /// The missing destination root.
        path: PathBuf,
    },

    /// The queried path does not exist.
    #[error("path not found: {}", .path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The queried path exists but is not a directory.
    #[error("not a directory: {}", .path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// Wraps standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
