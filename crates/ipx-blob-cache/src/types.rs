//! Cache types

use crate::meta::HeaderMap;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fresh entry returned from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CachedData {
    pub meta: HeaderMap,
    pub data: Bytes,
}

/// What a producer hands to the cache after generating an artifact
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub data: Bytes,
    pub meta: HeaderMap,
}

impl Payload {
    pub fn new(data: impl Into<Bytes>, meta: HeaderMap) -> Self {
        Self {
            data: data.into(),
            meta,
        }
    }
}

/// Read-only view of a stored entry, including stale ones
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub size: usize,
    pub fresh: bool,
    pub deadline: DateTime<Utc>,
    pub meta: Option<HeaderMap>,
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries found stale and purged on read
    pub expired: u64,
    /// Writes dropped because the store failed
    pub write_failures: u64,
}
