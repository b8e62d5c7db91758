//! TTL-bounded transaction metadata cache.

use std::collections::HashMap;

use activity_indexer_shared::felt::normalize_felt;
use activity_indexer_shared::types::TransactionMetadata;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::SessionStore;
use crate::CacheError;

/// Key the cache is persisted under in the session store.
pub const CACHE_STORAGE_KEY: &str = "activity-indexer:tx-metadata";

/// Entries older than this are treated as absent.
pub const CACHE_TTL_MINUTES: i64 = 15;

/// A cached enrichment result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    #[serde(flatten)]
    pub metadata: TransactionMetadata,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.cached_at) <= ttl
    }
}

/// Transaction metadata cache keyed by transaction hash.
///
/// Stale entries are ignored on read and dropped on load; they are never
/// evicted proactively. The backing store is best-effort and every store
/// failure degrades to an empty cache.
pub struct TransactionCache {
    entries: HashMap<String, CacheEntry>,
    store: Box<dyn SessionStore>,
    ttl: Duration,
}

impl TransactionCache {
    /// Restores the cache from the store, dropping entries already stale.
    pub fn init(store: Box<dyn SessionStore>) -> Self {
        Self::init_at(store, Utc::now())
    }

    pub fn init_at(store: Box<dyn SessionStore>, now: DateTime<Utc>) -> Self {
        Self::init_with_ttl_at(store, Duration::minutes(CACHE_TTL_MINUTES), now)
    }

    /// Restores the cache with a non-default TTL.
    pub fn init_with_ttl(store: Box<dyn SessionStore>, ttl: Duration) -> Self {
        Self::init_with_ttl_at(store, ttl, Utc::now())
    }

    pub fn init_with_ttl_at(store: Box<dyn SessionStore>, ttl: Duration, now: DateTime<Utc>) -> Self {
        let restored = match load_entries(store.as_ref()) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Transaction cache store unavailable, starting empty");
                HashMap::new()
            }
        };

        let restored_count = restored.len();
        let entries: HashMap<String, CacheEntry> = restored
            .into_iter()
            .filter(|(_, entry)| entry.is_fresh_at(now, ttl))
            .collect();

        let cache = Self {
            entries,
            store,
            ttl,
        };

        let dropped = restored_count - cache.entries.len();
        if dropped > 0 {
            debug!(dropped, "Dropped stale transaction cache entries on load");
            cache.persist();
        }

        cache
    }

    /// Returns the entry for `hash` unless it is absent or stale.
    pub fn get(&self, hash: &str) -> Option<&CacheEntry> {
        self.get_at(hash, Utc::now())
    }

    pub fn get_at(&self, hash: &str, now: DateTime<Utc>) -> Option<&CacheEntry> {
        self.entries
            .get(&normalize_felt(hash))
            .filter(|entry| entry.is_fresh_at(now, self.ttl))
    }

    /// Returns `true` when `hash` has no usable entry and should be fetched.
    pub fn needs_refresh_at(&self, hash: &str, now: DateTime<Utc>) -> bool {
        self.get_at(hash, now).is_none()
    }

    /// Inserts freshly resolved metadata, stamping every entry with `now`.
    pub fn put_many<I>(&mut self, resolved: I)
    where
        I: IntoIterator<Item = (String, TransactionMetadata)>,
    {
        self.put_many_at(resolved, Utc::now());
    }

    pub fn put_many_at<I>(&mut self, resolved: I, now: DateTime<Utc>)
    where
        I: IntoIterator<Item = (String, TransactionMetadata)>,
    {
        for (hash, metadata) in resolved {
            self.entries.insert(
                normalize_felt(&hash),
                CacheEntry {
                    metadata,
                    cached_at: now,
                },
            );
        }
        self.persist();
    }

    /// Drops every entry and removes the persisted copy.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.store.remove(CACHE_STORAGE_KEY) {
            warn!(error = %e, "Failed to clear persisted transaction cache");
        }
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(CacheError::from)
            .and_then(|json| self.store.set(CACHE_STORAGE_KEY, &json));

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist transaction cache");
        }
    }
}

fn load_entries(store: &dyn SessionStore) -> Result<HashMap<String, CacheEntry>, CacheError> {
    match store.get(CACHE_STORAGE_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(HashMap::new()),
    }
}
