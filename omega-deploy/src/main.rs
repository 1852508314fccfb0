//! OMEGA deployment entry point: runs the deployment sequence, then keeps the
//! controller's background loops alive until Ctrl+C.

mod files;
mod orchestrator;
mod settings;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::orchestrator::Orchestrator;
use crate::settings::DeployConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DeployConfig::from_env();
    info!(base_dir = %config.base_dir.display(), "OMEGA deploy starting");

    let mut orchestrator = Orchestrator::new(config);
    orchestrator.deploy().await.context("OMEGA deployment failed")?;
    orchestrator
        .maintain_operations()
        .await
        .context("OMEGA shutdown failed")?;

    Ok(())
}
