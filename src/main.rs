use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use stock_watcher::config::DEFAULT_CONFIG_PATH;
use stock_watcher::utils::logging;
use stock_watcher::{
    AppConfig, DiscordNotifier, HttpFetcher, LogJanitor, Notifier, StockMonitor, StockScheduler,
};

#[derive(Debug, Parser)]
#[command(name = "stock-watcher", version, about = "Announce product restocks to Discord")]
struct Cli {
    /// Configuration file, with or without the .toml extension
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = AppConfig::load(&cli.config).context("invalid configuration")?;
    let _log_guard = logging::init(&config.logging)?;

    info!("Starting Stock Watcher with {} products", config.products.len());

    let fetcher = Arc::new(HttpFetcher::new(&config.scraper)?);
    let notifier = Arc::new(DiscordNotifier::new(config.discord.clone())?);
    let monitor = StockMonitor::new(config.products.clone(), fetcher, notifier.clone());
    let janitor = LogJanitor::from_config(&config.logging);

    let handle = StockScheduler::new(monitor, janitor, &config.scheduler)
        .start(notifier.connect())
        .await
        .context("messaging connection failed")?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    let monitor = handle.stop().await?;
    for state in monitor.store().snapshot() {
        info!(
            "{}: in stock = {}, last checked = {:?}",
            state.product_name, state.is_in_stock, state.last_checked
        );
    }

    Ok(())
}
