//! Read-only reporting of a directory's immediate contents.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::tree::{DirectoryEntry, DirectoryListing, NodeKind};

/// Lists the immediate children of the directory at `path`.
///
/// One level only, no recursion. Entries are classified from the
/// filesystem's own metadata and returned in its native enumeration order;
/// no sorting is applied. Any read failure aborts the whole call, there is
/// no partial listing.
pub fn introspect(path: &Path) -> EngineResult<DirectoryListing> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(EngineError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    if !meta.is_dir() {
        return Err(EngineError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut children = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let kind = if entry.file_type()?.is_dir() {
            NodeKind::Directory
        } else {
            NodeKind::File
        };
        children.push(DirectoryEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
        });
    }

    Ok(DirectoryListing {
        name,
        kind: NodeKind::Directory,
        children,
    })
}
