//! IPX cache admin - inspect and maintain an on-disk artifact cache
//!
//! Operates on the same directory layout the image pipeline writes, so
//! entries can be checked or evicted by hand without restarting the
//! service.

mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Command};
use crate::error::Result;
use clap::Parser;
use ipx_blob_cache::{BlobCache, CacheConfig};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("ipx_cache_admin=info".parse()?)
        .add_directive("ipx_blob_cache=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    };

    let cli = Cli::parse();
    let config = cli.config(CacheConfig::from_env());
    info!(
        cache_dir = ?config.cache_dir,
        ttl_secs = config.default_ttl_secs,
        "Opening cache"
    );

    let cache = BlobCache::from_config(&config).await?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Inspect { path } => commands::inspect(&cache, &path, &mut out).await?,
        Command::Get { path } => commands::get(&cache, &path, &mut out).await?,
        Command::Del { path } => commands::del(&cache, &path, &mut out).await?,
        Command::Clear => commands::clear(&cache, &mut out).await?,
    }

    Ok(())
}
