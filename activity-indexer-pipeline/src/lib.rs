//! # Activity Indexer Pipeline
//! This crate turns raw contract event logs into a per-user, chronologically
//! ordered activity timeline.
//!
//! ## Modules
//!
//! - [`decoder`]: positional payload extractors and the per-kind decoder table
//! - [`consumer`]: paginated event streams, the stream registry, ledger sources
//! - [`processor`]: classification of decoded events into activities
//! - [`enrichment`]: batched transaction metadata lookups feeding the cache
//! - [`aggregate`]: dedup, user scoping, filtering, sorting, grouping, statistics
//! - [`orchestrator`]: the `ActivityEngine` tying everything together
//! - [`errors`]: error types of the pipeline
pub mod aggregate;
pub mod consumer;
pub mod decoder;
pub mod enrichment;
pub mod orchestrator;
pub mod processor;

pub mod errors;
