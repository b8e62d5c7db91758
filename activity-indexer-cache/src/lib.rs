//! Session-scoped cache of resolved transaction metadata.
//!
//! This crate provides:
//! - [`TransactionCache`], a TTL-bounded map from transaction hash to
//!   `{timestamp, sender}` with an explicit `init / get / put_many / clear`
//!   lifecycle
//! - [`SessionStore`], the string key-value store the cache is persisted to
//! - [`CacheSource`] config enum for choosing the store backend
//!
//! ## Usage
//!
//! ```ignore
//! use activity_indexer_cache::{CacheSource, TransactionCache};
//!
//! // Development: in-memory store, lost with the process
//! let cache = TransactionCache::init(CacheSource::memory().into_store());
//!
//! // Keep the session across restarts of the binary
//! let cache = TransactionCache::init(CacheSource::file("/tmp/activity-cache").into_store());
//! ```
//!
//! The store is best-effort: when it is unavailable the cache behaves as if
//! it had always been empty.

mod cache;
mod storage;

pub use cache::{CacheEntry, TransactionCache, CACHE_STORAGE_KEY, CACHE_TTL_MINUTES};
pub use storage::{CacheSource, DisabledStore, FileStore, MemoryStore, SessionStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
