//! Blob cache pairing each artifact with its response headers

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::freshness::{deadline, is_fresh};
use crate::meta::HeaderMap;
use crate::store::{meta_key, normalize_key, ByteStore, FsStore};
use crate::types::{CacheStats, CachedData, EntryInfo, Payload};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Anything that can serve as an artifact cache
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Fetch a fresh entry. Missing and expired entries are `Ok(None)`;
    /// only store failures are errors.
    async fn get(&self, path: &str) -> Result<Option<CachedData>>;

    /// Store an entry. Failures are logged and dropped, a failed write only
    /// costs a later miss.
    async fn set(&self, path: &str, value: Payload);

    /// Remove an entry. Never fails.
    async fn del(&self, path: &str);

    /// Wipe the whole namespace without waiting for it to finish
    fn clear(&self);
}

/// A blob cache on top of a [`ByteStore`].
///
/// Each entry is two records: the blob under `path` and its headers as
/// JSON under `<path>.json`. An entry stays fresh until its `expires`
/// header plus `default_ttl_secs`, and is purged by the first read that
/// finds it stale.
pub struct BlobCache<S = FsStore> {
    store: Arc<S>,
    default_ttl_secs: u64,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    write_failures: AtomicU64,
}

impl BlobCache<FsStore> {
    /// Create a file-backed cache, making sure the cache directory exists
    pub async fn from_config(config: &CacheConfig) -> Result<Self> {
        let store = FsStore::new(config.cache_dir.clone());
        store.init().await?;
        info!(
            cache_dir = ?config.cache_dir,
            ttl_secs = config.default_ttl_secs,
            "Blob cache initialized"
        );
        Ok(Self::new(store, config.default_ttl_secs))
    }
}

impl<S: ByteStore + 'static> BlobCache<S> {
    pub fn new(store: S, default_ttl_secs: u64) -> Self {
        Self::with_shared_store(Arc::new(store), default_ttl_secs)
    }

    pub fn with_shared_store(store: Arc<S>, default_ttl_secs: u64) -> Self {
        Self {
            store,
            default_ttl_secs,
            clock: Arc::new(SystemClock),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn default_ttl_secs(&self) -> u64 {
        self.default_ttl_secs
    }

    /// Look at an entry without judging or purging it
    pub async fn inspect(&self, path: &str) -> Result<Option<EntryInfo>> {
        let Some(data) = self.store.get_raw(path).await? else {
            return Ok(None);
        };
        let meta = self.read_meta(path).await?;
        let deadline = deadline(meta.as_ref(), self.default_ttl_secs);
        let fresh = is_fresh(meta.as_ref(), self.default_ttl_secs, self.clock.now());

        Ok(Some(EntryInfo {
            size: data.len(),
            fresh,
            deadline,
            meta,
        }))
    }

    /// Start wiping the namespace on the current runtime. The returned
    /// handle resolves to the outcome of the wipe; dropping it leaves the
    /// wipe running.
    pub fn clear_in_background(&self) -> Option<JoinHandle<Result<()>>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime available, skipping cache clear");
            return None;
        };

        let store = Arc::clone(&self.store);
        info!("Clearing cache");
        Some(runtime.spawn(async move {
            let result = store.clear_all().await;
            if let Err(e) = &result {
                warn!(error = %e, "Failed to clear cache");
            }
            result
        }))
    }

    /// Get current cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }

    async fn read_meta(&self, path: &str) -> Result<Option<HeaderMap>> {
        let Some(value) = self.store.get_item(&meta_key(path)).await? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) => {
                debug!(path, error = %e, "Ignoring undecodable cache metadata");
                Ok(None)
            }
        }
    }

    async fn write(&self, path: &str, value: Payload) -> Result<()> {
        // Reject bad paths before either record is written
        normalize_key(path)?;
        let meta = serde_json::to_value(&value.meta)?;
        let meta_key = meta_key(path);

        let (blob, meta) = tokio::join!(
            self.store.set_raw(path, value.data),
            self.store.set_item(&meta_key, &meta),
        );
        blob.and(meta)
    }

    fn record_write_failure(&self, path: &str, err: &CacheError) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
        warn!(path, error = %err, "Failed to cache artifact");
    }
}

#[async_trait]
impl<S: ByteStore + 'static> CacheStorage for BlobCache<S> {
    async fn get(&self, path: &str) -> Result<Option<CachedData>> {
        let Some(data) = self.store.get_raw(path).await? else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(path, "Cache miss");
            return Ok(None);
        };

        let meta = self.read_meta(path).await?;
        if !is_fresh(meta.as_ref(), self.default_ttl_secs, self.clock.now()) {
            debug!(
                path,
                deadline = %deadline(meta.as_ref(), self.default_ttl_secs),
                "Cache entry expired"
            );
            self.del(path).await;
            self.expired.fetch_add(1, Ordering::Relaxed);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(path, size = data.len(), "Cache hit");
        Ok(Some(CachedData {
            meta: meta.unwrap_or_default(),
            data,
        }))
    }

    async fn set(&self, path: &str, value: Payload) {
        let size = value.data.len();
        match self.write(path, value).await {
            Ok(()) => debug!(path, size, "Cached artifact"),
            Err(e) => self.record_write_failure(path, &e),
        }
    }

    async fn del(&self, path: &str) {
        let meta_key = meta_key(path);
        let (blob, meta) = tokio::join!(
            self.store.remove_item(path),
            self.store.remove_item(&meta_key),
        );

        // Best-effort cleanup
        if let Err(e) = blob.and(meta) {
            debug!(path, error = %e, "Ignoring failed cache delete");
        }
    }

    fn clear(&self) {
        let _ = self.clear_in_background();
    }
}
