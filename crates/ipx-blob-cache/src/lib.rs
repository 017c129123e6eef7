//! Persistent blob cache with header metadata and TTL expiration
//!
//! Stores derived artifacts (resized or transcoded images) next to the
//! response headers they were produced with. Freshness is re-derived on
//! every read from the stored `expires` header plus a configured TTL, and
//! expired entries are purged lazily when a read encounters them.

mod cache;
mod clock;
mod config;
mod error;
mod freshness;
mod meta;
mod store;
mod types;

pub use cache::{BlobCache, CacheStorage};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use freshness::{deadline, is_fresh, last_validated, parse_expires};
pub use meta::{HeaderMap, HeaderValue};
pub use store::{meta_key, normalize_key, ByteStore, FsStore, MemoryStore};
pub use types::{CacheStats, CachedData, EntryInfo, Payload};
