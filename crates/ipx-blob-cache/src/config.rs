//! Cache location and lifetime settings, with environment overrides

use std::env;
use std::path::PathBuf;

const DEFAULT_CACHE_DIR: &str = "./.cache/ipx";
const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60; // 24 hours

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub cache_dir: PathBuf,
    /// Seconds added to a stored `expires` header before an entry goes stale
    pub default_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            default_ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    /// Same as setting `maxAge` on the host module
    pub fn with_max_age(mut self, secs: u64) -> Self {
        self.default_ttl_secs = secs;
        self
    }

    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cache_dir = lookup("CACHE_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));

        let default_ttl_secs = lookup("CACHE_TTL_SECS")
            .or_else(|| lookup("CACHE_MAX_AGE"))
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TTL_SECS);

        Self {
            cache_dir,
            default_ttl_secs,
        }
    }
}
