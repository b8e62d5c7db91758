//! Error types for the Activity Indexer application.
//! Consolidates configuration, wiring and output failures of the binary.
#[derive(Debug, thiserror::Error)]
pub enum IndexingError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] activity_indexer_pipeline::errors::OrchestratorError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Tracing initialization error: {0}")]
    Tracing(String),
}
