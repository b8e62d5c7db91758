//! Error types for the orchestrator module of the Activity Indexer Pipeline.
use thiserror::Error;

/// Represents errors raised while assembling an `ActivityEngine`.
///
/// Runtime failures of streams and enrichment never surface here; they are
/// reported through the engine's error message instead.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}
