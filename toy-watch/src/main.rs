//! TOY Watch Service (toy-watch) - Main entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use toy_common::config::TomlConfig;
use toy_watch::api::{self, AppContext};
use toy_watch::config::Config;
use toy_watch::resolver::{CatalogResolver, MediaResolver};
use toy_watch::SharedState;

/// Command-line arguments for toy-watch
#[derive(Parser, Debug)]
#[command(name = "toy-watch")]
#[command(about = "Sequential clip player service for TOY watch pages")]
#[command(version)]
struct Args {
    /// Config file (overrides TOY_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "TOY_WATCH_PORT")]
    port: Option<u16>,

    /// Card catalog (TOML)
    #[arg(long, env = "TOY_CATALOG")]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; otherwise the configured level replaces this default once loaded
    let rust_log = EnvFilter::try_from_default_env().ok();
    let env_overrides = rust_log.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(rust_log.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref());
    if !env_overrides {
        let level = &toml_config.logging.level;
        match EnvFilter::try_new(level) {
            Ok(configured) => {
                if let Err(e) = filter_handle.reload(configured) {
                    warn!("Failed to apply log level {}: {}", level, e);
                }
            }
            Err(e) => warn!("Invalid log level {:?}: {} (keeping info)", level, e),
        }
    }

    let mut config = Config::from(toml_config);
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(catalog) = args.catalog {
        config.catalog_path = Some(catalog);
    }

    info!("Starting TOY watch service on port {}", config.port);

    let resolver: Arc<dyn MediaResolver> = match &config.catalog_path {
        Some(path) => Arc::new(
            CatalogResolver::load(path)
                .with_context(|| format!("Failed to load card catalog {}", path.display()))?,
        ),
        None => {
            warn!("No card catalog configured, every share token will be not found");
            Arc::new(CatalogResolver::empty())
        }
    };

    let state = Arc::new(SharedState::new());
    let ctx = AppContext::new(&config, state, resolver);

    api::run(ctx).await.context("HTTP server failed")?;

    Ok(())
}
