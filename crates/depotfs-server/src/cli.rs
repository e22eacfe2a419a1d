//! Command-line interface: the `serve` subcommand plus a thin HTTP client
//! for the common operations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reqwest::Client;

use depotfs_engine::{DirectoryListing, NodeKind};

use crate::api::FileApi;
use crate::config::{RoutesConfig, ServerConfig};

/// DepotFS file storage server and client.
#[derive(Parser)]
#[command(name = "depot-server")]
#[command(about = "DepotFS file storage server and client", long_about = None)]
pub struct Cli {
    /// Base URL of a running server, for client subcommands.
    #[arg(short, long, default_value = "http://localhost:8080", env = "DEPOT_SERVER")]
    pub server: String,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Config file; defaults apply if it does not exist.
        #[arg(short, long, default_value = "/etc/depotfs/server.toml")]
        config: PathBuf,
    },
    /// Check server health.
    Health,
    /// List the immediate contents of a folder.
    Structure {
        /// Folder path relative to the storage root.
        path: String,
    },
    /// Create a folder.
    Mkdir {
        /// Folder path relative to the storage root.
        path: String,
    },
    /// Delete a file or folder.
    Rm {
        /// Path relative to the storage root.
        path: String,
    },
    /// Move a file into another folder, keeping its name.
    Mv {
        /// Current path of the file.
        source: String,
        /// Destination folder.
        dest: String,
    },
    /// Upload a local file into a folder.
    Upload {
        /// Local file to send.
        local_file: PathBuf,
        /// Destination folder relative to the storage root.
        #[arg(short, long, default_value = "")]
        dest: String,
    },
    /// Download a file.
    Download {
        /// File path relative to the storage root.
        file: String,
        /// Where to write the file; defaults to its base name.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Runs the selected subcommand.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Serve { ref config } => serve(config.clone()).await,
            Command::Health => self.health().await,
            Command::Structure { ref path } => self.structure(path).await,
            Command::Mkdir { ref path } => self.mkdir(path).await,
            Command::Rm { ref path } => self.rm(path).await,
            Command::Mv { ref source, ref dest } => self.mv(source, dest).await,
            Command::Upload {
                ref local_file,
                ref dest,
            } => self.upload(local_file.clone(), dest).await,
            Command::Download {
                ref file,
                ref output,
            } => self.download(file, output.clone()).await,
        }
    }

    fn routes(&self) -> RoutesConfig {
        RoutesConfig::default()
    }

    async fn health(&self) -> Result<()> {
        let response = Client::new()
            .get(format!("{}/health", self.server))
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("Request failed: {}", response.status());
        }
        let body: serde_json::Value = response.json().await?;
        println!(
            "status: {}  version: {}",
            body["status"].as_str().unwrap_or("unknown"),
            body["version"].as_str().unwrap_or("unknown")
        );
        Ok(())
    }

    async fn structure(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.server, self.routes().folder_structure);
        let response = Client::new()
            .get(url)
            .query(&[("folder_path", path)])
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("Request failed: {}", response.status());
        }

        let listing: DirectoryListing = response.json().await?;
        println!("{}/", listing.name);
        for entry in &listing.children {
            match entry.kind {
                NodeKind::Directory => println!("  {}/", entry.name),
                NodeKind::File => println!("  {}", entry.name),
            }
        }
        Ok(())
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.server, self.routes().create_folder);
        let response = Client::new()
            .post(url)
            .json(&serde_json::json!({"path": path}))
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("Request failed: {}", response.status());
        }
        println!("created {}", path);
        Ok(())
    }

    async fn rm(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.server, self.routes().file_delete);
        let response = Client::new()
            .post(url)
            .json(&serde_json::json!({"path": path}))
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("Request failed: {}", response.status());
        }
        println!("deleted {}", path);
        Ok(())
    }

    async fn mv(&self, source: &str, dest: &str) -> Result<()> {
        let url = format!("{}{}", self.server, self.routes().file_move);
        let response = Client::new()
            .post(url)
            .json(&serde_json::json!({
                "source_path": source,
                "destination_path": dest,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("Request failed: {}", response.status());
        }
        println!("moved {} -> {}", source, dest);
        Ok(())
    }

    async fn upload(&self, local_file: PathBuf, dest: &str) -> Result<()> {
        let file_name = local_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("local path has no file name"))?;
        let data = tokio::fs::read(&local_file).await?;

        let part = reqwest::multipart::Part::bytes(data).file_name(file_name.clone());
        let form = reqwest::multipart::Form::new()
            .text("upload_file_path", dest.to_string())
            .part("file", part);

        let url = format!("{}{}", self.server, self.routes().upload);
        let response = Client::new().post(url).multipart(form).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Request failed: {}", response.status());
        }
        println!("uploaded {} to '{}'", file_name, dest);
        Ok(())
    }

    async fn download(&self, file: &str, output: Option<PathBuf>) -> Result<()> {
        let url = format!("{}{}", self.server, self.routes().download);
        let response = Client::new()
            .get(url)
            .query(&[("file_name", file)])
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("Request failed: {}", response.status());
        }

        let target = output.unwrap_or_else(|| {
            PathBuf::from(
                std::path::Path::new(file)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| String::from("download")),
            )
        });
        let bytes = response.bytes().await?;
        tokio::fs::write(&target, &bytes).await?;
        println!("wrote {} ({} bytes)", target.display(), bytes.len());
        Ok(())
    }
}

async fn serve(config_path: PathBuf) -> Result<()> {
    let config = if config_path.exists() {
        ServerConfig::from_file(&config_path)?
    } else {
        tracing::warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        ServerConfig::default()
    };

    FileApi::new(Arc::new(config)).serve().await
}
