//! Temporary tar.gz archives for whole-folder download.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use uuid::Uuid;

/// A packed folder archive on disk, removed when the value is dropped.
///
/// Holding the archive in a guard ties the temporary file's lifetime to the
/// response being built from it, so cleanup happens on every exit path.
pub struct TempArchive {
    path: PathBuf,
    file_name: String,
}

impl TempArchive {
    /// Packs `src_dir` into a fresh `.tar.gz` under `tmp_dir`.
    ///
    /// A partially written archive is removed before the error is returned.
    pub fn pack(src_dir: &Path, tmp_dir: &Path) -> io::Result<Self> {
        let base = src_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("folder"));
        let path = tmp_dir.join(format!("{}-{}.tar.gz", base, Uuid::new_v4()));

        if let Err(e) = pack_dir(src_dir, &base, &path) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        tracing::debug!(archive = %path.display(), "packed folder archive");
        Ok(Self {
            path,
            file_name: format!("{}.tar.gz", base),
        })
    }

    /// Location of the packed archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Download name for the archive, derived from the folder's base name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn pack_dir(src_dir: &Path, base: &str, dest: &Path) -> io::Result<()> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(base, src_dir)?;
    let encoder = builder.into_inner()?;
    encoder.finish()?;
    Ok(())
}
