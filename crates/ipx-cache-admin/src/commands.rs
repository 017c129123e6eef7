//! Subcommand handlers

use crate::error::{AdminError, Result};
use ipx_blob_cache::{BlobCache, ByteStore, CacheStorage, HeaderMap};
use serde::Serialize;
use std::io::Write;
use tracing::info;

#[derive(Serialize)]
struct HitReport<'a> {
    path: &'a str,
    size: usize,
    meta: &'a HeaderMap,
}

pub async fn inspect<S: ByteStore + 'static>(
    cache: &BlobCache<S>,
    path: &str,
    out: &mut impl Write,
) -> Result<()> {
    match cache.inspect(path).await? {
        Some(info) => {
            serde_json::to_writer_pretty(&mut *out, &info)?;
            writeln!(out)?;
        }
        None => writeln!(out, "{}: not cached", path)?,
    }
    Ok(())
}

pub async fn get<S: ByteStore + 'static>(
    cache: &BlobCache<S>,
    path: &str,
    out: &mut impl Write,
) -> Result<()> {
    match cache.get(path).await? {
        Some(entry) => {
            let report = HitReport {
                path,
                size: entry.data.len(),
                meta: &entry.meta,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        None => writeln!(out, "{}: miss", path)?,
    }
    Ok(())
}

pub async fn del<S: ByteStore + 'static>(
    cache: &BlobCache<S>,
    path: &str,
    out: &mut impl Write,
) -> Result<()> {
    cache.del(path).await;
    info!(path, "Deleted cache entry");
    writeln!(out, "{}: deleted", path)?;
    Ok(())
}

/// Unlike the fire-and-forget `clear`, waits for the wipe and fails if it
/// did, so "cache cleared" is only printed once the namespace is empty
pub async fn clear<S: ByteStore + 'static>(
    cache: &BlobCache<S>,
    out: &mut impl Write,
) -> Result<()> {
    let handle = cache
        .clear_in_background()
        .ok_or_else(|| AdminError::Task("no async runtime to run the wipe on".to_string()))?;
    handle.await??;
    writeln!(out, "cache cleared")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use ipx_blob_cache::{CacheConfig, Clock, FsStore, ManualClock, MemoryStore, Payload};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_inspect_reports_entry() {
        let cache = BlobCache::new(MemoryStore::new(), 3600);
        let meta = HeaderMap::new()
            .with("content-type", "image/webp")
            .with_expires(Utc::now());
        cache.set("/a.webp", Payload::new(&b"webp"[..], meta)).await;

        let mut buf = Vec::new();
        inspect(&cache, "/a.webp", &mut buf).await.unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["size"], 4);
        assert_eq!(json["fresh"], true);
        assert_eq!(json["meta"]["content-type"], "image/webp");
    }

    #[tokio::test]
    async fn test_inspect_missing_entry() {
        let cache = BlobCache::new(MemoryStore::new(), 3600);

        let mut buf = Vec::new();
        inspect(&cache, "/nope", &mut buf).await.unwrap();
        assert_eq!(output(buf), "/nope: not cached\n");
    }

    #[tokio::test]
    async fn test_get_purges_stale_entry() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = BlobCache::new(MemoryStore::new(), 10).with_clock(clock.clone());
        cache
            .set("/a", Payload::new(&b"a"[..], HeaderMap::new().with_expires(clock.now())))
            .await;

        let mut buf = Vec::new();
        get(&cache, "/a", &mut buf).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["path"], "/a");
        assert_eq!(json["size"], 1);

        clock.advance(Duration::seconds(11));
        let mut buf = Vec::new();
        get(&cache, "/a", &mut buf).await.unwrap();
        assert_eq!(output(buf), "/a: miss\n");
        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_del_and_clear_on_disk() {
        let dir = tempdir().unwrap();
        let cache = BlobCache::from_config(&CacheConfig::new(dir.path()))
            .await
            .unwrap();
        let meta = HeaderMap::new().with_expires(Utc::now());
        cache.set("/a.png", Payload::new(&b"a"[..], meta.clone())).await;
        cache.set("/b/c.png", Payload::new(&b"c"[..], meta)).await;

        let mut buf = Vec::new();
        del(&cache, "/a.png", &mut buf).await.unwrap();
        assert_eq!(output(buf), "/a.png: deleted\n");
        assert!(cache.inspect("/a.png").await.unwrap().is_none());

        let mut buf = Vec::new();
        clear(&cache, &mut buf).await.unwrap();
        assert_eq!(output(buf), "cache cleared\n");
        assert!(cache.inspect("/b/c.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_reports_failed_wipe() {
        // A regular file where the cache directory should be cannot be listed
        let dir = tempdir().unwrap();
        let not_a_dir = dir.path().join("cache");
        std::fs::write(&not_a_dir, b"occupied").unwrap();
        let cache = BlobCache::new(FsStore::new(&not_a_dir), 3600);

        let mut buf = Vec::new();
        let err = clear(&cache, &mut buf).await.unwrap_err();
        assert!(matches!(err, AdminError::Cache(_)));
        assert!(buf.is_empty());
        assert!(not_a_dir.is_file());
    }
}
