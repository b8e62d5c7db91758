//! Mock event source for testing and local development.
//!
//! Pages are registered per `(contract, event kind)` and served in order.
//! Continuation tokens are the index of the next page.
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use activity_indexer_shared::felt::normalize_felt;
use activity_indexer_shared::types::{EventKind, RawEvent};
use async_trait::async_trait;

use crate::consumer::{EventPage, EventPageRequest, EventSource};
use crate::errors::ConsumerError;

type PageKey = (String, EventKind);

/// In-memory `EventSource` with injectable failures.
#[derive(Default)]
pub struct MockEventSource {
    pages: RwLock<HashMap<PageKey, Vec<Vec<RawEvent>>>>,
    failing: RwLock<HashSet<EventKind>>,
    requests: Mutex<Vec<EventPageRequest>>,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pages served for a subscription, replacing earlier ones.
    pub fn register_pages(&self, contract_address: &str, kind: EventKind, pages: Vec<Vec<RawEvent>>) {
        if let Ok(mut registered) = self.pages.write() {
            registered.insert((normalize_felt(contract_address), kind), pages);
        }
    }

    /// Makes every fetch of `kind` fail until recovered.
    pub fn fail_kind(&self, kind: EventKind) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(kind);
        }
    }

    pub fn recover_kind(&self, kind: EventKind) {
        if let Ok(mut failing) = self.failing.write() {
            failing.remove(&kind);
        }
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<EventPageRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn fetch_page(&self, request: &EventPageRequest) -> Result<EventPage, ConsumerError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let failing = self
            .failing
            .read()
            .map_err(|_| ConsumerError::Unavailable("mock state poisoned".to_string()))?;
        if failing.contains(&request.kind) {
            return Err(ConsumerError::Rpc {
                code: -32603,
                message: format!("mock failure for {}", request.kind),
            });
        }

        let index = match &request.continuation_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ConsumerError::MalformedResponse(format!("bad token {token}")))?,
            None => 0,
        };

        let registered = self
            .pages
            .read()
            .map_err(|_| ConsumerError::Unavailable("mock state poisoned".to_string()))?;
        let pages = registered
            .get(&(normalize_felt(&request.contract_address), request.kind))
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(EventPage {
            events: pages.get(index).cloned().unwrap_or_default(),
            continuation_token: (index + 1 < pages.len()).then(|| (index + 1).to_string()),
        })
    }
}

/// Builders for raw events in the layouts the decoder table expects.
pub mod mock_events {
    use activity_indexer_shared::types::{EventKind, RawEvent};

    use crate::consumer::rpc::event_selector;

    fn raw(
        kind: EventKind,
        contract_address: &str,
        transaction_hash: &str,
        block_number: Option<u64>,
        keys: Vec<String>,
        data: &[&str],
    ) -> RawEvent {
        RawEvent {
            kind,
            contract_address: contract_address.to_string(),
            transaction_hash: transaction_hash.to_string(),
            block_number,
            keys,
            data: data.iter().map(|value| value.to_string()).collect(),
        }
    }

    /// Keyed `Transfer(from, to, token_id)`.
    pub fn transfer(
        contract_address: &str,
        transaction_hash: &str,
        block_number: Option<u64>,
        from: &str,
        to: &str,
        token_id: &str,
    ) -> RawEvent {
        raw(
            EventKind::Transfer,
            contract_address,
            transaction_hash,
            block_number,
            vec![event_selector("Transfer"), from.to_string(), to.to_string()],
            &[token_id],
        )
    }

    /// `TransferBatch(from, to, ids...)`.
    pub fn transfer_batch(
        contract_address: &str,
        transaction_hash: &str,
        block_number: Option<u64>,
        from: &str,
        to: &str,
        token_ids: &[&str],
    ) -> RawEvent {
        let mut data = vec![from, to];
        data.extend_from_slice(token_ids);
        raw(
            EventKind::TransferBatch,
            contract_address,
            transaction_hash,
            block_number,
            vec![event_selector("TransferBatch")],
            &data,
        )
    }

    /// Factory `TokenMinted(from, to, token_id)`.
    pub fn token_minted(
        contract_address: &str,
        transaction_hash: &str,
        block_number: Option<u64>,
        to: &str,
        token_id: &str,
    ) -> RawEvent {
        raw(
            EventKind::TokenMinted,
            contract_address,
            transaction_hash,
            block_number,
            vec![event_selector("TokenMinted")],
            &["0x0", to, token_id],
        )
    }

    /// Factory `CollectionCreated(collection_id, creator)`.
    pub fn collection_created(
        contract_address: &str,
        transaction_hash: &str,
        block_number: Option<u64>,
        collection_id: &str,
        creator: &str,
    ) -> RawEvent {
        raw(
            EventKind::CollectionCreated,
            contract_address,
            transaction_hash,
            block_number,
            vec![event_selector("CollectionCreated")],
            &[collection_id, creator],
        )
    }

    /// `MetadataUpdate(token_id)`.
    pub fn metadata_update(
        contract_address: &str,
        transaction_hash: &str,
        block_number: Option<u64>,
        token_id: &str,
    ) -> RawEvent {
        raw(
            EventKind::MetadataUpdate,
            contract_address,
            transaction_hash,
            block_number,
            vec![event_selector("MetadataUpdate")],
            &[token_id],
        )
    }
}
