//! Sentinel engine binary.

use std::path::PathBuf;

use anyhow::Result;
use sentinel_engine::{EngineConfig, EngineService};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    sentinel_common_log::init(sentinel_common_log::LogConfig::from_env())?;

    let config_path = std::env::var_os("SENTINEL_CONFIG").map(PathBuf::from);
    let config = EngineConfig::load(config_path.as_deref())?;

    info!("Starting Sentinel engine v{}", env!("CARGO_PKG_VERSION"));

    let mut service = EngineService::new(config);
    service.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    service.stop().await?;
    service.wait().await?;

    info!("Engine shutdown complete");
    Ok(())
}
