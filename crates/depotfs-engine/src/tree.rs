//! Tree descriptions submitted by clients and listings reported back.
//!
//! The upload side is fully recursive: a [`TreeNode`] describes an entire
//! hierarchy to create. The query side is deliberately one level deep: a
//! [`DirectoryListing`] carries only the immediate children of the queried
//! directory. The asymmetry is intentional.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether an entry is a directory or a regular file.
///
/// Encoded on the wire as the string literals `"directory"` and `"file"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A directory that may contain children.
    Directory,
    /// A regular file backed by an uploaded payload.
    File,
}

/// Structural problems in a client-submitted tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A file node carried child nodes.
    #[error("file node {path} must not have children")]
    FileWithChildren {
        /// Computed path of the offending node.
        path: String,
    },

    /// A non-root node had an empty name, which would produce an empty
    /// path segment.
    #[error("node under \"{parent}\" has an empty name")]
    EmptyName {
        /// Computed path of the parent node.
        parent: String,
    },
}

/// One entry in a client-submitted tree description.
///
/// `client_ref` keys a file node into the per-request blob table. It is
/// distinct from `name` because the transport may rename uploaded parts to
/// avoid collisions between identically named files in sibling folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Path segment this node contributes.
    pub name: String,
    /// Directory or file.
    pub kind: NodeKind,
    /// Blob table key for file nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
    /// Child nodes, meaningful only for directories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Builds a directory node.
    pub fn dir(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            client_ref: None,
            children,
        }
    }

    /// Builds a file node pointing at an uploaded payload.
    pub fn file(name: impl Into<String>, client_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            client_ref: Some(client_ref.into()),
            children: Vec::new(),
        }
    }

    /// Checks the structural invariants of the tree.
    ///
    /// The root node's own name is never used as a path segment, so it may
    /// be empty; every other node needs a non-empty name, and file nodes
    /// must be leaves.
    pub fn validate(&self) -> Result<(), TreeError> {
        self.check("", true)
    }

    fn check(&self, parent: &str, is_root: bool) -> Result<(), TreeError> {
        if !is_root && self.name.is_empty() {
            return Err(TreeError::EmptyName {
                parent: parent.to_string(),
            });
        }
        let path = if is_root {
            String::new()
        } else if parent.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", parent, self.name)
        };
        if self.kind == NodeKind::File && !self.children.is_empty() {
            return Err(TreeError::FileWithChildren { path });
        }
        for child in &self.children {
            child.check(&path, false)?;
        }
        Ok(())
    }
}

/// One immediate child reported by the introspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Entry name.
    pub name: String,
    /// Directory or file.
    pub kind: NodeKind,
}

/// Introspection result for one directory: itself plus its immediate
/// children, exactly one level deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// Base name of the queried directory.
    pub name: String,
    /// Always [`NodeKind::Directory`].
    pub kind: NodeKind,
    /// Immediate children in the filesystem's enumeration order.
    pub children: Vec<DirectoryEntry>,
}
