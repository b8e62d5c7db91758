//! Error types for the enrichment fetcher.
use activity_indexer_enrichment::EnrichmentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetcherError {
    #[error("Enrichment request failed: {0}")]
    Enrichment(#[from] EnrichmentError),
}
