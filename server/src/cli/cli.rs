// server/src/cli/cli.rs

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lib::seed::seed_demo_data;
use lib::{open_sled_db, ClinicStorageEngine, SledClinicStorage, StorageConfig};
use rest_api::{load_rest_api_config, start_server, RestApiConfig};
use tracing::{error, info};

use crate::cli::commands::{CliArgs, Commands, SeedArgs, ServeArgs};

/// Parses the command line and runs the chosen command to completion.
pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();
    match args.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(serve_args) => run_serve(serve_args).await,
        Commands::Seed(seed_args) => run_seed(seed_args).await,
    }
}

/// Command line flags win over every configuration layer.
fn apply_overrides(mut config: RestApiConfig, args: &ServeArgs) -> RestApiConfig {
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(path) = &args.storage_path {
        config.storage_path = path.clone();
    }
    config
}

fn open_storage(path: &Path) -> Result<Arc<SledClinicStorage>> {
    let db = open_sled_db(&StorageConfig::new(path))
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    let storage = SledClinicStorage::new(db).context("Failed to open clinic collections")?;
    Ok(Arc::new(storage))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining connections."),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = apply_overrides(load_rest_api_config(args.config_file.as_deref())?, &args);
    info!("Using database at {}", config.storage_path.display());
    let storage = open_storage(&config.storage_path)?;

    let served: Arc<dyn ClinicStorageEngine> = storage.clone();
    start_server(&config, served, shutdown_signal()).await?;

    storage.flush().await.context("Failed to flush database on shutdown")?;
    Ok(())
}

async fn run_seed(args: SeedArgs) -> Result<()> {
    let mut config = load_rest_api_config(args.config_file.as_deref())?;
    if let Some(path) = args.storage_path {
        config.storage_path = path;
    }
    let storage = open_storage(&config.storage_path)?;
    seed_demo_data(storage.as_ref()).await.context("Seeding failed")?;
    info!("Seeded demo data into {}", config.storage_path.display());
    Ok(())
}
