//! `lorahub` — device catalog tooling.
//!
//! Usage:
//!   lorahub create-package --source <catalog-dir> --output <package.zip> [--overwrite]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use lorahub_fetch::FsFetcher;

/// Device catalog tooling.
#[derive(Parser, Debug)]
#[command(name = "lorahub", about = "LoRaWAN device catalog tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a distributable package from a raw catalog checkout.
    CreatePackage {
        /// Path to the root of the device catalog.
        #[arg(long)]
        source: PathBuf,

        /// Where to write the package.
        #[arg(long)]
        output: PathBuf,

        /// Overwrite previously built index files in the source directory.
        #[arg(long)]
        overwrite: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::CreatePackage {
            source,
            output,
            overwrite,
        } => {
            info!("building package from {}", source.display());
            let fetcher = Arc::new(FsFetcher::new(source.clone()));
            lorahub_index::create_package(fetcher, &source, &output, overwrite)
                .map_err(|e| anyhow::anyhow!("failed to create package: {e}"))?;
            info!("package written to {}", output.display());
        }
    }
    Ok(())
}
