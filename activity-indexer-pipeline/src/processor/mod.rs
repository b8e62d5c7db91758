//! Classification of decoded events into timeline activities.
mod activity_processor;
mod describe;

pub use activity_processor::{resolve_activity_type, ActivityProcessor};
pub use describe::describe;

use activity_indexer_cache::TransactionCache;
use activity_indexer_shared::types::{ActivityItem, RawEvent};
use chrono::{DateTime, Utc};

/// Everything classification reads besides the event itself.
///
/// `now` is captured once per snapshot so every unresolved activity of the
/// same snapshot shares one fallback timestamp.
pub struct ClassificationContext<'a> {
    pub user_address: &'a str,
    pub network: &'a str,
    pub cache: &'a TransactionCache,
    pub now: DateTime<Utc>,
}

pub trait ProcessEvents {
    fn process(&self, events: &[&RawEvent], ctx: &ClassificationContext<'_>) -> Vec<ActivityItem>;
}
