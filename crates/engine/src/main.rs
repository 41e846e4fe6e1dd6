//! shelterd entry point.
//!
//! Boots the engine against the configured origin: installs the current
//! version (prefetching the baseline assets), activates it (pruning stale
//! partitions), and reports cache status. Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::Result;
use shelter_client::{HttpNetwork, NetworkConfig};
use shelter_core::{AppConfig, CacheDb};
use shelter_engine::Engine;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        static_partition = %config.static_partition,
        data_partition = %config.data_partition,
        "starting shelterd"
    );

    let store = CacheDb::open(&config.db_path).await?;
    let network = HttpNetwork::new(NetworkConfig {
        origin: config.origin.clone(),
        user_agent: config.user_agent.clone(),
        timeout: config.timeout(),
        ..Default::default()
    })?;

    let engine = Engine::new(config, store, Arc::new(network));

    engine.install().await?;
    engine.activate().await?;

    for partition in engine.cache_status().await? {
        tracing::info!(partition = %partition.name, entries = partition.entries, "cache status");
    }

    Ok(())
}
