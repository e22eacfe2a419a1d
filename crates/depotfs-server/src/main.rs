//! DepotFS server binary.

use anyhow::Result;
use clap::Parser;
use depotfs_server::cli::Cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    Cli::parse().run().await
}
