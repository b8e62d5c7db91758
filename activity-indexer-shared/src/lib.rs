//! # Activity Indexer Shared
//! This crate defines the data structures shared across the activity indexer
//! ecosystem: raw ledger events, the canonical activity record, filter and
//! pagination state, timeline statistics, and the felt/address helpers used
//! to compare values coming from different event shapes.
pub mod felt;
pub mod types;
