//! Mock enrichment client for testing and local development.
//!
//! The `MockEnricher` can be pre-populated with hash → metadata mappings and
//! records every batch it receives, so tests can assert on how many lookup
//! rounds were issued and with which hashes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use activity_indexer_shared::felt::normalize_felt;
use activity_indexer_shared::types::TransactionMetadata;
use async_trait::async_trait;

use crate::{EnrichmentError, Result, TransactionEnricher};

/// Mock client that returns pre-configured metadata.
#[derive(Default)]
pub struct MockEnricher {
    resolved: RwLock<HashMap<String, TransactionMetadata>>,
    calls: Mutex<Vec<Vec<String>>>,
    failing: AtomicBool,
}

impl MockEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client pre-populated with the given mappings.
    pub fn with_metadata(resolved: HashMap<String, TransactionMetadata>) -> Self {
        let client = Self::new();
        for (hash, metadata) in resolved {
            client.register(&hash, metadata);
        }
        client
    }

    /// Register the metadata returned for `hash`.
    pub fn register(&self, hash: &str, metadata: TransactionMetadata) {
        if let Ok(mut resolved) = self.resolved.write() {
            resolved.insert(normalize_felt(hash), metadata);
        }
    }

    /// Make every following call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Batches received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TransactionEnricher for MockEnricher {
    async fn enrich(&self, hashes: &[String]) -> Result<HashMap<String, TransactionMetadata>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(hashes.to_vec());
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(EnrichmentError::NetworkError("mock enrichment failure".to_string()));
        }

        let resolved = self
            .resolved
            .read()
            .map_err(|_| EnrichmentError::NetworkError("mock state poisoned".to_string()))?;

        Ok(hashes
            .iter()
            .filter_map(|hash| {
                resolved
                    .get(&normalize_felt(hash))
                    .map(|metadata| (hash.clone(), metadata.clone()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn metadata(sender: &str) -> TransactionMetadata {
        TransactionMetadata {
            timestamp: DateTime::from_timestamp(1_713_859_200, 0).unwrap(),
            sender: sender.to_string(),
        }
    }

    #[tokio::test]
    async fn test_returns_only_registered_hashes() {
        let client = MockEnricher::new();
        client.register("0x0abc", metadata("0x1"));

        let resolved = client
            .enrich(&["0xabc".to_string(), "0xdef".to_string()])
            .await
            .unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved["0xabc"].sender, "0x1");
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_recorded() {
        let client = MockEnricher::new();
        client.set_failing(true);

        let result = client.enrich(&["0xabc".to_string()]).await;
        assert!(matches!(result, Err(EnrichmentError::NetworkError(_))));
        assert_eq!(client.calls(), vec![vec!["0xabc".to_string()]]);
    }
}
