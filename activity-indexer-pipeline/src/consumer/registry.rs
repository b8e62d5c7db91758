//! Registry of every event subscription, kept in registration order.
use std::sync::Arc;

use activity_indexer_shared::types::{ContractRole, EventKind, RawEvent};
use futures03::future::join_all;
use tracing::{info, instrument};

use crate::consumer::{EventSource, EventStream, StreamKey};
use crate::errors::ConsumerError;

/// Owns one `EventStream` per `(contract, event kind)` subscription.
///
/// Registration order is significant: it decides which event wins
/// deduplication and which stream error is reported first.
#[derive(Default)]
pub struct StreamRegistry {
    streams: Vec<EventStream>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to every known event kind, factory events first.
    pub fn standard(
        source: Arc<dyn EventSource>,
        factory_contract_address: &str,
        asset_contract_address: &str,
        from_block: u64,
        page_size: u32,
    ) -> Self {
        let mut registry = Self::new();
        for kind in EventKind::ALL {
            let contract = match kind.contract_role() {
                ContractRole::CollectionFactory => factory_contract_address,
                ContractRole::Asset => asset_contract_address,
            };
            registry.register(EventStream::new(
                StreamKey::new(contract, kind),
                source.clone(),
                from_block,
                page_size,
            ));
        }
        registry
    }

    /// Adds a stream. A stream with the same key is replaced in place.
    pub fn register(&mut self, stream: EventStream) {
        match self.streams.iter_mut().find(|s| s.key() == stream.key()) {
            Some(existing) => *existing = stream,
            None => self.streams.push(stream),
        }
    }

    pub fn get(&self, key: &StreamKey) -> Option<&EventStream> {
        self.streams.iter().find(|s| s.key() == key)
    }

    pub fn streams(&self) -> &[EventStream] {
        &self.streams
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// `true` while any stream still has a page to fetch.
    pub fn has_more(&self) -> bool {
        self.streams.iter().any(EventStream::has_next_page)
    }

    /// `true` while any stream is waiting for its first page or fetching.
    pub fn is_loading(&self) -> bool {
        self.streams
            .iter()
            .any(|s| s.is_pending() || s.is_fetching())
    }

    /// Errors of failed streams, in registration order.
    pub fn errors(&self) -> impl Iterator<Item = (&StreamKey, &ConsumerError)> {
        self.streams
            .iter()
            .filter_map(|s| s.error().map(|e| (s.key(), e)))
    }

    /// Every loaded event across all streams, in registration order.
    pub fn events(&self) -> impl Iterator<Item = &RawEvent> {
        self.streams.iter().flat_map(|s| s.events())
    }

    /// Fetches the next page of every stream that has one, concurrently.
    ///
    /// Returns the failures in registration order; successful streams keep
    /// their new pages regardless.
    #[instrument(skip(self))]
    pub async fn load_more(&mut self) -> Vec<(StreamKey, ConsumerError)> {
        let fetches = self
            .streams
            .iter_mut()
            .filter(|s| s.has_next_page())
            .map(|stream| async move {
                let key = stream.key().clone();
                stream.fetch_next_page().await.err().map(|e| (key, e))
            });

        let failures: Vec<_> = join_all(fetches).await.into_iter().flatten().collect();
        info!(
            streams = self.streams.len(),
            failed = failures.len(),
            has_more = self.has_more(),
            "Loaded next event pages"
        );
        failures
    }

    /// Drops every loaded page and fetches the first page of every stream.
    #[instrument(skip(self))]
    pub async fn refetch_all(&mut self) -> Vec<(StreamKey, ConsumerError)> {
        let fetches = self.streams.iter_mut().map(|stream| async move {
            let key = stream.key().clone();
            stream.refetch().await.err().map(|e| (key, e))
        });

        join_all(fetches).await.into_iter().flatten().collect()
    }
}
