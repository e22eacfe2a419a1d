//! Server configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Route paths for every operation the server exposes.
///
/// All of them are configurable; the defaults below are what the CLI client
/// assumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Single-file upload (multipart POST).
    pub upload: String,
    /// Single-file download (GET).
    pub download: String,
    /// File move (POST).
    pub file_move: String,
    /// File or folder delete (POST).
    pub file_delete: String,
    /// Folder creation (POST).
    pub create_folder: String,
    /// Whole-folder upload (multipart POST).
    pub upload_folder: String,
    /// Whole-folder download as an archive (GET).
    pub download_folder: String,
    /// One-level folder structure query (GET).
    pub folder_structure: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            upload: String::from("/api/v1/files/upload"),
            download: String::from("/api/v1/files/download"),
            file_move: String::from("/api/v1/files/move"),
            file_delete: String::from("/api/v1/files/delete"),
            create_folder: String::from("/api/v1/folders/create"),
            upload_folder: String::from("/api/v1/folders/upload"),
            download_folder: String::from("/api/v1/folders/download"),
            folder_structure: String::from("/api/v1/folders/structure"),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Directory all client-visible paths are rooted under.
    pub storage_root: PathBuf,
    /// Scratch directory for temporary folder archives.
    pub archive_tmp_dir: PathBuf,
    /// Upper bound on request bodies, uploads included.
    pub max_upload_bytes: usize,
    /// Route paths.
    pub routes: RoutesConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            storage_root: PathBuf::from("/var/lib/depotfs/storage"),
            archive_tmp_dir: PathBuf::from("/var/lib/depotfs/tmp"),
            max_upload_bytes: 32 * 1024 * 1024,
            routes: RoutesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads a config file, dispatching on the file extension.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => {
                let config: ServerConfig = toml::from_str(&contents)?;
                Ok(config)
            }
            "json" => {
                let config: ServerConfig = serde_json::from_str(&contents)?;
                Ok(config)
            }
            _ => anyhow::bail!("Unsupported config file extension: {}", ext),
        }
    }
}
