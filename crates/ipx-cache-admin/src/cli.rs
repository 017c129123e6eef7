use clap::{Parser, Subcommand};
use ipx_blob_cache::CacheConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ipx-cache")]
#[command(version, about = "Inspect and maintain an IPX artifact cache", long_about = None)]
pub struct Cli {
    /// Cache directory, overrides CACHE_DIR
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Seconds added to an entry's expires header, overrides CACHE_TTL_SECS
    #[arg(long, global = true)]
    pub ttl: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Show an entry's size, deadline and headers without purging it
    Inspect { path: String },
    /// Read an entry the way the image pipeline does (purges it if stale)
    Get { path: String },
    /// Delete an entry
    Del { path: String },
    /// Wipe the whole cache
    Clear,
}

impl Cli {
    /// Environment configuration with command line overrides applied
    pub fn config(&self, base: CacheConfig) -> CacheConfig {
        let mut config = base;
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(ttl) = self.ttl {
            config.default_ttl_secs = ttl;
        }
        config
    }
}
