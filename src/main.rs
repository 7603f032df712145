// agentwatch daemon: sweeps the configured scan-ID range on a fixed tick
// and keeps the file-backed agent store current. The HTTP API and bot
// layers read that store out-of-process; this binary only crawls.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agentwatch::{
    AgentStore, ChromiumFetcher, CrawlScheduler, ScoutConfig, VirtualsExtractor,
};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn config_from_env() -> Result<ScoutConfig> {
    let storage_dir = env_or("AGENTWATCH_DATA_DIR", "training_data");
    let base_url = env_or("AGENTWATCH_BASE_URL", "https://app.virtuals.io");

    let mut builder = ScoutConfig::builder()
        .storage_dir(storage_dir)
        .base_url(base_url);

    if let (Ok(start), Ok(max)) = (
        env_or("AGENTWATCH_SCAN_START", "").parse::<u32>(),
        env_or("AGENTWATCH_SCAN_MAX", "").parse::<u32>(),
    ) {
        builder = builder.scan_range(start, max);
    }
    if env_or("AGENTWATCH_HEADFUL", "") == "1" {
        builder = builder.headless(false);
    }

    builder.build()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agentwatch=info")),
        )
        .init();

    let config = config_from_env()?;
    info!(
        storage_dir = %config.storage_dir().display(),
        base_url = config.base_url(),
        "starting agentwatch"
    );

    let store = Arc::new(AgentStore::new(config.storage_dir()));
    let fetcher = Arc::new(ChromiumFetcher::new(
        config.base_url(),
        config.debug_dir(),
        config.headless(),
        config.fetch_timeout(),
        config.render_settle(),
    ));
    let extractor = Arc::new(VirtualsExtractor::new());

    let scheduler = Arc::new(CrawlScheduler::new(
        config,
        Arc::clone(&store),
        fetcher,
        extractor,
    ));
    scheduler.start().await;

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping scheduler");
    scheduler.shutdown().await;
    info!("agentwatch stopped");
    Ok(())
}
