//! Process-local byte store

use super::{decode_item, normalize_key, ByteStore};
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory byte store. Items are kept serialized so reads behave the
/// same as against [`FsStore`](super::FsStore).
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    pub async fn contains(&self, key: &str) -> bool {
        match normalize_key(key) {
            Ok(key) => self.data.read().await.contains_key(&key),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl ByteStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<Bytes>> {
        let key = normalize_key(key)?;
        Ok(self.data.read().await.get(&key).cloned())
    }

    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_raw(key).await?.map(|data| decode_item(&data)))
    }

    async fn set_raw(&self, key: &str, data: Bytes) -> Result<()> {
        let key = normalize_key(key)?;
        self.data.write().await.insert(key, data);
        Ok(())
    }

    async fn set_item(&self, key: &str, value: &Value) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        self.set_raw(key, Bytes::from(data)).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let key = normalize_key(key)?;
        self.data.write().await.remove(&key);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.data.write().await.clear();
        Ok(())
    }
}
