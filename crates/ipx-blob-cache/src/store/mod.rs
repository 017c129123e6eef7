//! Byte store capability the cache is built on

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::{CacheError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// Suffix of the key holding an entry's metadata
const META_SUFFIX: &str = ".json";

/// Durable key/value storage for raw bytes and small JSON records.
///
/// Every operation may suspend on I/O. Implementations must be safe to
/// call concurrently; the cache adds no locking of its own.
#[async_trait]
pub trait ByteStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<Bytes>>;

    async fn get_item(&self, key: &str) -> Result<Option<Value>>;

    async fn set_raw(&self, key: &str, data: Bytes) -> Result<()>;

    async fn set_item(&self, key: &str, value: &Value) -> Result<()>;

    /// Removing a key that does not exist is not an error
    async fn remove_item(&self, key: &str) -> Result<()>;

    async fn clear_all(&self) -> Result<()>;
}

/// Key under which the metadata for `path` is stored
pub fn meta_key(path: &str) -> String {
    format!("{}{}", path, META_SUFFIX)
}

/// Normalize a cache key into `:`-separated segments.
///
/// Both slash kinds become `:`, repeated separators collapse and leading or
/// trailing separators are dropped, so `/img/a.png` and `img:a.png` name
/// the same entry. Empty keys and `..` segments are rejected.
pub fn normalize_key(key: &str) -> Result<String> {
    let normalized = key
        .split(['/', '\\', ':'])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();

    if normalized.is_empty() || normalized.iter().any(|segment| *segment == "..") {
        return Err(CacheError::InvalidKey(key.to_string()));
    }

    Ok(normalized.join(":"))
}

/// Decode a stored item. Anything that is not JSON comes back as a string.
fn decode_item(data: &[u8]) -> Value {
    serde_json::from_slice(data)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(data).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_separators() {
        assert_eq!(normalize_key("/img/a.png").unwrap(), "img:a.png");
        assert_eq!(normalize_key("img\\a.png").unwrap(), "img:a.png");
        assert_eq!(normalize_key("//img//w_100///a.png/").unwrap(), "img:w_100:a.png");
        assert_eq!(normalize_key("img:a.png").unwrap(), "img:a.png");
    }

    #[test]
    fn test_normalize_key_keeps_query() {
        assert_eq!(
            normalize_key("/_ipx/w_200/a.png?v=2").unwrap(),
            "_ipx:w_200:a.png?v=2"
        );
    }

    #[test]
    fn test_normalize_key_rejects_empty_and_traversal() {
        assert!(matches!(normalize_key(""), Err(CacheError::InvalidKey(_))));
        assert!(matches!(normalize_key("///"), Err(CacheError::InvalidKey(_))));
        assert!(matches!(normalize_key("../secret"), Err(CacheError::InvalidKey(_))));
        assert!(matches!(normalize_key("/img/../../x"), Err(CacheError::InvalidKey(_))));

        // Dots inside a segment are fine
        assert!(normalize_key("/img/..a.png").is_ok());
    }

    #[test]
    fn test_meta_key() {
        assert_eq!(meta_key("/img/a.png"), "/img/a.png.json");
    }

    #[test]
    fn test_decode_item() {
        assert_eq!(decode_item(br#"{"a":1}"#), serde_json::json!({"a": 1}));
        assert_eq!(decode_item(b"plain text"), Value::String("plain text".into()));
    }
}
