//! Client for the batch transaction-enrichment service.
//!
//! Ledger event logs omit the submission timestamp and the submitting
//! account of a transaction. This crate resolves both for a batch of
//! transaction hashes.
//!
//! This crate provides:
//! - [`EnrichmentSource`] config enum for choosing between mock and live clients
//! - [`TransactionEnricher`] trait for abstracting the lookup
//! - [`HttpEnricher`] production client calling `POST {base}/enrich`
//! - [`MockEnricher`] mock client with pre-configured hash → metadata mappings
//!
//! ## Usage
//!
//! ```ignore
//! use activity_indexer_enrichment::EnrichmentSource;
//!
//! let enricher = EnrichmentSource::live("https://enrich.example.com").into_enricher();
//! let resolved = enricher.enrich(&["0x5427...".to_string()]).await?;
//! ```

mod mock;

pub use mock::MockEnricher;

use std::collections::HashMap;

use activity_indexer_shared::types::TransactionMetadata;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use tracing::debug;

/// Maximum number of hashes the service accepts in one call.
pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("batch of {size} hashes exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },
    #[error("network error: {0}")]
    NetworkError(String),
}

pub type Result<T> = std::result::Result<T, EnrichmentError>;

/// Trait for resolving transaction metadata in batches.
///
/// Hashes missing from the returned map are simply unresolved; that is not
/// an error.
#[async_trait]
pub trait TransactionEnricher: Send + Sync {
    async fn enrich(&self, hashes: &[String]) -> Result<HashMap<String, TransactionMetadata>>;
}

#[derive(Serialize)]
struct EnrichRequest<'a> {
    hashes: &'a [String],
}

/// Production client for the enrichment service.
pub struct HttpEnricher {
    url: String,
    client: ReqwestClient,
}

impl HttpEnricher {
    pub fn new(base_url: &str) -> Self {
        HttpEnricher {
            url: format!("{}/enrich", base_url.trim_end_matches('/')),
            client: ReqwestClient::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TransactionEnricher for HttpEnricher {
    async fn enrich(&self, hashes: &[String]) -> Result<HashMap<String, TransactionMetadata>> {
        if hashes.is_empty() {
            return Ok(HashMap::new());
        }
        if hashes.len() > MAX_BATCH_SIZE {
            return Err(EnrichmentError::BatchTooLarge {
                size: hashes.len(),
                limit: MAX_BATCH_SIZE,
            });
        }

        debug!(hash_count = hashes.len(), url = %self.url, "Requesting transaction enrichment");

        let res = self
            .client
            .post(&self.url)
            .json(&EnrichRequest { hashes })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(EnrichmentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(res.json::<HashMap<String, TransactionMetadata>>().await?)
    }
}

/// Configuration for the enrichment data source.
#[derive(Debug, Clone)]
pub enum EnrichmentSource {
    /// Use the mock client with pre-configured hash → metadata mappings.
    Mock(HashMap<String, TransactionMetadata>),

    /// Call a live enrichment service.
    Live {
        /// Base URL of the service (e.g., "https://enrich.example.com")
        base_url: String,
    },
}

impl EnrichmentSource {
    pub fn mock(resolved: HashMap<String, TransactionMetadata>) -> Self {
        Self::Mock(resolved)
    }

    pub fn live(base_url: impl Into<String>) -> Self {
        Self::Live {
            base_url: base_url.into(),
        }
    }

    /// Create the appropriate `TransactionEnricher` implementation.
    pub fn into_enricher(self) -> Box<dyn TransactionEnricher> {
        match self {
            Self::Mock(resolved) => Box::new(MockEnricher::with_metadata(resolved)),
            Self::Live { base_url } => Box::new(HttpEnricher::new(&base_url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            HttpEnricher::new("https://enrich.example.com/").endpoint(),
            "https://enrich.example.com/enrich"
        );
    }

    #[tokio::test]
    async fn test_http_enricher_rejects_oversized_batch() {
        let enricher = HttpEnricher::new("http://127.0.0.1:9");
        let hashes: Vec<String> = (0..=MAX_BATCH_SIZE).map(|i| format!("0x{i:x}")).collect();
        let result = enricher.enrich(&hashes).await;
        assert!(matches!(result, Err(EnrichmentError::BatchTooLarge { size: 101, .. })));
    }

    #[tokio::test]
    async fn test_http_enricher_skips_empty_batch() {
        let enricher = HttpEnricher::new("http://127.0.0.1:9");
        assert!(enricher.enrich(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_response_shape_deserializes() {
        let json = r#"{"0xabc":{"timestampIso":"2024-04-23T08:00:00Z","sender":"0x1"}}"#;
        let parsed: HashMap<String, TransactionMetadata> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed["0xabc"].sender, "0x1");
        assert_eq!(parsed["0xabc"].timestamp.timestamp(), 1_713_859_200);
    }
}
