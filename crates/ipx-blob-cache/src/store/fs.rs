//! File-per-key storage below a base directory

use super::{decode_item, normalize_key, ByteStore};
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info};

/// Distinguishes temp files of concurrent writers within one process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A byte store that keeps one file per key. Key segments become nested
/// directories, so `img:w_100:a.png` lives at `<base>/img/w_100/a.png`.
#[derive(Debug, Clone)]
pub struct FsStore {
    base: PathBuf,
}

impl FsStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Ensure the base directory exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.base).await?;
        info!(cache_dir = ?self.base, "Cache directory initialized");
        Ok(())
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let key = normalize_key(key)?;
        let mut path = self.base.clone();
        path.extend(key.split(':'));
        Ok(path)
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file and rename it over the target, so a
    /// concurrent reader sees either the old contents or the new ones
    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = temp_path(&path);
        let written = match fs::write(&tmp, data).await {
            Ok(()) => fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    if let Some(file_name) = path.file_name() {
        name.push(file_name);
    }
    name.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    path.with_file_name(name)
}

#[async_trait]
impl ByteStore for FsStore {
    async fn get_raw(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.read(key).await?.map(Bytes::from))
    }

    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read(key).await?.map(|data| decode_item(&data)))
    }

    async fn set_raw(&self, key: &str, data: Bytes) -> Result<()> {
        self.write(key, &data).await
    }

    async fn set_item(&self, key: &str, value: &Value) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        self.write(key, &data).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear_all(&self) -> Result<()> {
        let mut entries = match fs::read_dir(&self.base).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0usize;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                fs::remove_dir_all(&path).await?;
            } else {
                fs::remove_file(&path).await?;
            }
            removed += 1;
        }

        debug!(cache_dir = ?self.base, removed, "Cleared cache directory");
        Ok(())
    }
}
