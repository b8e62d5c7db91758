//! Consumer module for the activity indexer pipeline.
//!
//! Provides the `EventSource` trait for paging contract event logs out of a
//! ledger, the per-subscription `EventStream` state and the `StreamRegistry`
//! that fans pagination out over every subscription.

use crate::errors::ConsumerError;

pub mod mock;
pub mod registry;
pub mod rpc;
pub mod stream;

pub use mock::MockEventSource;
pub use registry::StreamRegistry;
pub use rpc::RpcEventSource;
pub use stream::EventStream;

use activity_indexer_shared::felt::normalize_felt;
use activity_indexer_shared::types::{EventKind, RawEvent};
use async_trait::async_trait;

/// Identity of one subscription: a contract and one of its event kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey {
    pub contract_address: String,
    pub kind: EventKind,
}

impl StreamKey {
    pub fn new(contract_address: &str, kind: EventKind) -> Self {
        Self {
            contract_address: normalize_felt(contract_address),
            kind,
        }
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.kind, self.contract_address)
    }
}

/// Request for the next page of one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPageRequest {
    pub contract_address: String,
    pub kind: EventKind,
    pub from_block: u64,
    pub page_size: u32,
    pub continuation_token: Option<String>,
}

/// One page of events. A `None` continuation token means the subscription
/// is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub continuation_token: Option<String>,
}

/// Trait for paging contract event logs out of a ledger.
///
/// Implementations must be safe to call concurrently for different
/// subscriptions.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetches the page identified by `request.continuation_token`, or the
    /// first page when it is `None`.
    async fn fetch_page(&self, request: &EventPageRequest) -> Result<EventPage, ConsumerError>;
}
