//! Activity Indexer
//!
//! Wires the activity pipeline to a ledger node, the enrichment service and a
//! session store, all configured from the environment.
pub mod config;
pub mod errors;

pub use config::{Dependencies, IndexerConfig};
pub use errors::IndexingError;
