//! Campaign Keyword Matcher (v1)
//!
//! Classifies transcribed utterances into outcome labels per campaign and
//! conversation stage, using keyword files that reload when edited.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                  KEYWORD MATCHER                      │
//!                  │                                                       │
//!  POST /match     │  ┌─────────┐    ┌───────────────┐    ┌────────────┐  │
//!  ────────────────┼─▶│  http   │───▶│ CampaignCache │───▶│  Matcher   │  │
//!                  │  │ server  │    │ (RwLock map)  │    │ (per file) │  │
//!  ◀───────────────┼──│         │◀───│               │◀───│ classify() │  │
//!  {result}        │  └─────────┘    └───────▲───────┘    └────────────┘  │
//!                  │                         │ evict                      │
//!                  │                  ┌──────┴───────┐                    │
//!  keywords/*.json─┼─────────────────▶│   watcher    │                    │
//!                  │    notify events │  (debounce)  │                    │
//!                  │                  └──────────────┘                    │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use keyword_matcher::campaign::CampaignCache;
use keyword_matcher::config::{load_config, CampaignWatcher, ServiceConfig};
use keyword_matcher::http::HttpServer;
use keyword_matcher::lifecycle::{shutdown::trigger_on_ctrl_c, Shutdown};
use keyword_matcher::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "keyword-matcher")]
#[command(about = "Campaign keyword classification service", long_about = None)]
struct Args {
    /// Service configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override campaigns.keywords_dir.
    #[arg(short, long)]
    keywords_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(dir) = args.keywords_dir {
        config.campaigns.keywords_dir = dir;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("keyword-matcher v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        keywords_dir = ?config.campaigns.keywords_dir,
        debounce_ms = config.campaigns.debounce_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let cache = Arc::new(CampaignCache::new(
        config.campaigns.keywords_dir.clone(),
        config.matching.to_options(),
    ));

    // Without the watcher cached matchers could go stale: refuse to serve
    let watcher = CampaignWatcher::new(
        cache.clone(),
        Duration::from_millis(config.campaigns.debounce_ms),
    )?;
    let watcher_task = tokio::spawn(watcher.run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, cache);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    trigger_on_ctrl_c(&shutdown).await;

    server_task.await??;
    watcher_task.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
