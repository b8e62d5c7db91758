//! Error types for the consumer module of the Activity Indexer Pipeline.
//! Defines errors that can occur while paging event logs out of a ledger source.
use thiserror::Error;

/// Represents errors that can occur while fetching a page of events.
///
/// Errors are cloned into the owning stream's state so that a failed stream
/// keeps reporting its failure until the next successful fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsumerError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ConsumerError {
    fn from(e: reqwest::Error) -> Self {
        ConsumerError::Transport(e.to_string())
    }
}
