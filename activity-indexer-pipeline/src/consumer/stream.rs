//! Pagination state of a single event subscription.
use std::sync::Arc;

use activity_indexer_shared::types::RawEvent;
use tracing::{debug, instrument, warn};

use crate::consumer::{EventPage, EventPageRequest, EventSource, StreamKey};
use crate::errors::ConsumerError;

/// Accumulated pages and fetch status of one subscription.
///
/// A fetch failure is recorded on the stream and leaves the pages already
/// loaded untouched, so one failing subscription never affects the others.
pub struct EventStream {
    key: StreamKey,
    source: Arc<dyn EventSource>,
    from_block: u64,
    page_size: u32,
    pages: Vec<Vec<RawEvent>>,
    continuation_token: Option<String>,
    is_pending: bool,
    is_fetching: bool,
    has_next_page: bool,
    error: Option<ConsumerError>,
}

impl EventStream {
    pub fn new(key: StreamKey, source: Arc<dyn EventSource>, from_block: u64, page_size: u32) -> Self {
        Self {
            key,
            source,
            from_block,
            page_size,
            pages: Vec::new(),
            continuation_token: None,
            is_pending: true,
            is_fetching: false,
            has_next_page: true,
            error: None,
        }
    }

    pub fn key(&self) -> &StreamKey {
        &self.key
    }

    pub fn pages(&self) -> &[Vec<RawEvent>] {
        &self.pages
    }

    /// Every loaded event, in page order.
    pub fn events(&self) -> impl Iterator<Item = &RawEvent> {
        self.pages.iter().flatten()
    }

    /// `true` until the first fetch settles.
    pub fn is_pending(&self) -> bool {
        self.is_pending
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn error(&self) -> Option<&ConsumerError> {
        self.error.as_ref()
    }

    /// Fetches the next page and appends it.
    ///
    /// Returns the number of events received. A stream without a next page
    /// is left untouched.
    #[instrument(skip(self), fields(stream = %self.key))]
    pub async fn fetch_next_page(&mut self) -> Result<usize, ConsumerError> {
        if !self.has_next_page {
            return Ok(0);
        }

        let page = self.fetch(self.continuation_token.clone()).await?;
        let received = page.events.len();
        self.has_next_page = page.continuation_token.is_some();
        self.continuation_token = page.continuation_token;
        self.pages.push(page.events);
        debug!(received, has_next_page = self.has_next_page, "Fetched event page");
        Ok(received)
    }

    /// Fetches the first page again and replaces every loaded page with it.
    ///
    /// On failure the loaded pages and cursor are kept and only the error is
    /// recorded.
    #[instrument(skip(self), fields(stream = %self.key))]
    pub async fn refetch(&mut self) -> Result<usize, ConsumerError> {
        let page = self.fetch(None).await?;
        let received = page.events.len();
        self.has_next_page = page.continuation_token.is_some();
        self.continuation_token = page.continuation_token;
        self.pages = vec![page.events];
        debug!(received, has_next_page = self.has_next_page, "Refetched first event page");
        Ok(received)
    }

    async fn fetch(&mut self, continuation_token: Option<String>) -> Result<EventPage, ConsumerError> {
        let request = EventPageRequest {
            contract_address: self.key.contract_address.clone(),
            kind: self.key.kind,
            from_block: self.from_block,
            page_size: self.page_size,
            continuation_token,
        };

        self.is_fetching = true;
        let result = self.source.fetch_page(&request).await;
        self.is_fetching = false;
        self.is_pending = false;

        match result {
            Ok(page) => {
                self.error = None;
                Ok(page)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch event page");
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::mock::{mock_events, MockEventSource};
    use activity_indexer_shared::types::EventKind;

    const ASSET: &str = "0xa55e7";

    fn stream(source: Arc<MockEventSource>) -> EventStream {
        EventStream::new(StreamKey::new(ASSET, EventKind::Transfer), source, 0, 2)
    }

    #[tokio::test]
    async fn test_pages_until_exhausted() {
        let source = Arc::new(MockEventSource::new());
        source.register_pages(
            ASSET,
            EventKind::Transfer,
            vec![
                vec![mock_events::transfer(ASSET, "0x1", Some(1), "0xa", "0xb", "0x1")],
                vec![mock_events::transfer(ASSET, "0x2", Some(2), "0xa", "0xb", "0x2")],
            ],
        );

        let mut stream = stream(source);
        assert!(stream.is_pending());

        assert_eq!(stream.fetch_next_page().await.unwrap(), 1);
        assert!(!stream.is_pending());
        assert!(stream.has_next_page());

        assert_eq!(stream.fetch_next_page().await.unwrap(), 1);
        assert!(!stream.has_next_page());
        assert_eq!(stream.events().count(), 2);

        assert_eq!(stream.fetch_next_page().await.unwrap(), 0);
        assert_eq!(stream.pages().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_loaded_pages() {
        let source = Arc::new(MockEventSource::new());
        source.register_pages(
            ASSET,
            EventKind::Transfer,
            vec![
                vec![mock_events::transfer(ASSET, "0x1", Some(1), "0xa", "0xb", "0x1")],
                vec![mock_events::transfer(ASSET, "0x2", Some(2), "0xa", "0xb", "0x2")],
            ],
        );

        let mut stream = stream(source.clone());
        stream.fetch_next_page().await.unwrap();

        source.fail_kind(EventKind::Transfer);
        assert!(stream.fetch_next_page().await.is_err());
        assert!(stream.error().is_some());
        assert!(stream.has_next_page());
        assert_eq!(stream.events().count(), 1);

        source.recover_kind(EventKind::Transfer);
        stream.fetch_next_page().await.unwrap();
        assert!(stream.error().is_none());
        assert_eq!(stream.events().count(), 2);
    }

    #[tokio::test]
    async fn test_refetch_starts_over() {
        let source = Arc::new(MockEventSource::new());
        source.register_pages(
            ASSET,
            EventKind::Transfer,
            vec![vec![mock_events::transfer(ASSET, "0x1", Some(1), "0xa", "0xb", "0x1")]],
        );

        let mut stream = stream(source.clone());
        stream.fetch_next_page().await.unwrap();
        stream.refetch().await.unwrap();

        assert_eq!(stream.pages().len(), 1);
        let requests = source.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_loaded_pages() {
        let source = Arc::new(MockEventSource::new());
        source.register_pages(
            ASSET,
            EventKind::Transfer,
            vec![
                vec![mock_events::transfer(ASSET, "0x1", Some(1), "0xa", "0xb", "0x1")],
                vec![mock_events::transfer(ASSET, "0x2", Some(2), "0xa", "0xb", "0x2")],
            ],
        );

        let mut stream = stream(source.clone());
        stream.fetch_next_page().await.unwrap();

        source.fail_kind(EventKind::Transfer);
        assert!(stream.refetch().await.is_err());
        assert!(stream.error().is_some());
        assert_eq!(stream.events().count(), 1);
        assert!(stream.has_next_page());

        source.recover_kind(EventKind::Transfer);
        stream.fetch_next_page().await.unwrap();
        assert_eq!(stream.events().count(), 2);
    }
}
