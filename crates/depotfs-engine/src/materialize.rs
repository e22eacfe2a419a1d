//! Reproduces a client-submitted tree description on disk.
//!
//! Traversal is depth-first pre-order. A failure on one node stops descent
//! into that node's subtree only; siblings keep going, and every failure is
//! appended to a shared error list keyed by the node's computed path.
//! Partial completion is the designed outcome: there is no rollback, and
//! whatever was created before an error stays on disk.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::blobs::BlobTable;
use crate::error::{EngineError, EngineResult};
use crate::tree::{NodeKind, TreeNode};

/// Outcome of one materialization call.
#[derive(Debug)]
pub struct MaterializeReport {
    errors: Vec<String>,
}

impl MaterializeReport {
    /// True if every node in the tree was created.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collected per-node errors, in traversal order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Consumes the report, yielding the error list.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// Creates the directories and files described by `tree` under `root`.
///
/// `root` must already exist and be a directory. The top-level node of the
/// tree is not itself materialized: its children land directly under
/// `root`, so the root node's name never becomes a path segment.
///
/// Existing directories are never merged into or overwritten; a directory
/// node whose path already exists is recorded as an error and its subtree
/// is skipped.
pub fn materialize(
    root: &Path,
    tree: &TreeNode,
    blobs: &BlobTable,
) -> EngineResult<MaterializeReport> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(EngineError::DestinationMissing {
                path: root.to_path_buf(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(EngineError::DestinationMissing {
                path: root.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    }

    tracing::debug!(root = %root.display(), blobs = blobs.len(), "materializing tree");

    let mut errors = Vec::new();
    for child in &tree.children {
        visit(root, Path::new(""), child, blobs, &mut errors);
    }
    Ok(MaterializeReport { errors })
}

fn visit(root: &Path, base: &Path, node: &TreeNode, blobs: &BlobTable, errors: &mut Vec<String>) {
    let rel: PathBuf = base.join(&node.name);
    let path = root.join(&rel);
    match node.kind {
        NodeKind::Directory => {
            if path.exists() {
                errors.push(format!("directory {} is exist", rel.display()));
                return;
            }
            // Single-level create: ancestors were created by this same
            // traversal, or the branch already failed and we never got here.
            if let Err(e) = fs::create_dir(&path) {
                errors.push(format!("create directory {}: {}", rel.display(), e));
                return;
            }
            for child in &node.children {
                visit(root, &rel, child, blobs, errors);
            }
        }
        NodeKind::File => write_file(&path, &rel, node, blobs, errors),
    }
}

fn write_file(
    path: &Path,
    rel: &Path,
    node: &TreeNode,
    blobs: &BlobTable,
    errors: &mut Vec<String>,
) {
    let blob = match node.client_ref.as_deref().and_then(|r| blobs.get(r)) {
        Some(blob) => blob,
        None => {
            errors.push(format!("unable to find file information: {}", rel.display()));
            return;
        }
    };
    let mut dest = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            errors.push(format!("create file {}: {}", rel.display(), e));
            return;
        }
    };
    let mut source = match blob.open() {
        Ok(r) => r,
        Err(e) => {
            errors.push(format!("open upload for {}: {}", rel.display(), e));
            return;
        }
    };
    if let Err(e) = io::copy(&mut source, &mut dest) {
        errors.push(format!("copy upload into {}: {}", rel.display(), e));
    }
}
