//! Containment of untrusted request paths inside the storage root.
//!
//! Every path a client sends is joined onto the storage root here before it
//! reaches the engine; the engine itself performs no further resolution.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Rejection reasons for untrusted request paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The request path was absolute or carried a filesystem prefix.
    #[error("absolute paths are not allowed: {0}")]
    Absolute(String),

    /// The request path contained a `..` component.
    #[error("path escapes the storage root: {0}")]
    Escapes(String),
}

/// Joins an untrusted relative path onto `root`.
///
/// Absolute paths and `..` components are rejected rather than resolved;
/// `.` components and empty segments are dropped. An empty input resolves
/// to `root` itself.
pub fn resolve_under(root: &Path, untrusted: &str) -> Result<PathBuf, PathError> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(untrusted).components() {
        match component {
            Component::Normal(segment) => resolved.push(segment),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {
                return Err(PathError::Absolute(untrusted.to_string()))
            }
            Component::ParentDir => return Err(PathError::Escapes(untrusted.to_string())),
        }
    }
    Ok(resolved)
}
