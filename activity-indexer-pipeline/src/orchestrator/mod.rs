//! This module defines the `ActivityEngine` responsible for coordinating the
//! activity pipeline.
//! It integrates the stream registry, the processor, the enrichment fetcher
//! and the transaction cache, and derives the user's timeline from them on
//! demand.
use std::sync::Arc;

use activity_indexer_cache::{TransactionCache, CACHE_TTL_MINUTES};
use activity_indexer_enrichment::{TransactionEnricher, MAX_BATCH_SIZE};
use activity_indexer_shared::types::{
    ActivityFilter, ActivityGroup, ActivityItem, ActivityStatistics, ActivityType, DateRange,
    FilterUpdate, PaginationState, RawEvent, SortBy, SortOrder,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::aggregate::build_timeline;
use crate::consumer::{StreamKey, StreamRegistry};
use crate::enrichment::{
    collect_transaction_hashes, BatchEnrichmentFetcher, CompletedRound, EnrichmentRound,
    RoundOutcome,
};
use crate::errors::{ConsumerError, FetcherError, OrchestratorError};
use crate::processor::{ActivityProcessor, ClassificationContext};

/// Tunables of the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Network label stamped on every activity.
    pub network: String,
    pub from_block: u64,
    pub page_size: u32,
    pub enrichment_batch_limit: usize,
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network: "mainnet".to_string(),
            from_block: 0,
            page_size: 100,
            enrichment_batch_limit: MAX_BATCH_SIZE,
            cache_ttl: Duration::minutes(CACHE_TTL_MINUTES),
        }
    }
}

/// Everything the rendering side needs, computed at one instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    pub activities: Vec<ActivityItem>,
    pub grouped_activities: Vec<ActivityGroup>,
    pub statistics: ActivityStatistics,
    pub loading: bool,
    pub error: Option<String>,
    pub filter: ActivityFilter,
    pub pagination: PaginationState,
}

/// `ActivityEngine` owns every piece of mutable state of the pipeline.
///
/// Derived data (activities, groups, statistics) is never stored; each
/// snapshot recomputes it from the loaded events, the cache and the filter.
/// Failures of individual streams or of enrichment are kept in a single
/// sticky error message: the first one wins until `clear_error` or
/// `refresh`.
pub struct ActivityEngine {
    config: EngineConfig,
    user_address: String,
    registry: StreamRegistry,
    processor: ActivityProcessor,
    cache: TransactionCache,
    fetcher: BatchEnrichmentFetcher,
    filter: ActivityFilter,
    error: Option<String>,
    page: u32,
}

impl ActivityEngine {
    /// Creates a new `ActivityEngine`.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine tunables
    /// * `user_address` - Address the timeline is scoped to
    /// * `registry` - Streams to page events from, in precedence order
    /// * `enricher` - Batch transaction metadata lookup
    /// * `cache` - Transaction metadata cache, already restored
    pub fn new(
        config: EngineConfig,
        user_address: &str,
        registry: StreamRegistry,
        enricher: Arc<dyn TransactionEnricher>,
        cache: TransactionCache,
    ) -> Result<Self, OrchestratorError> {
        if user_address.trim().is_empty() {
            return Err(OrchestratorError::InvalidConfig(
                "user address must not be empty".to_string(),
            ));
        }
        if registry.is_empty() {
            return Err(OrchestratorError::InvalidConfig(
                "no event streams registered".to_string(),
            ));
        }
        if config.page_size == 0 {
            return Err(OrchestratorError::InvalidConfig(
                "page size must be positive".to_string(),
            ));
        }

        let fetcher = BatchEnrichmentFetcher::new(enricher, config.enrichment_batch_limit);
        Ok(Self {
            config,
            user_address: user_address.to_string(),
            registry,
            processor: ActivityProcessor::default(),
            cache,
            fetcher,
            filter: ActivityFilter::default(),
            error: None,
            page: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn user_address(&self) -> &str {
        &self.user_address
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &TransactionCache {
        &self.cache
    }

    pub fn filter(&self) -> &ActivityFilter {
        &self.filter
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `true` while any stream or an enrichment round is loading.
    pub fn loading(&self) -> bool {
        self.registry.is_loading() || self.fetcher.is_loading()
    }

    pub fn has_more(&self) -> bool {
        self.registry.has_more()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads the next page of every stream that has one, then runs one
    /// enrichment cycle over the grown event set.
    #[instrument(skip(self), fields(page = self.page))]
    pub async fn on_load_more(&mut self) {
        if !self.registry.has_more() {
            info!("Every stream is exhausted");
            return;
        }

        self.fetcher.supersede();
        let failures = self.registry.load_more().await;
        self.record_stream_failures(failures);
        self.page += 1;

        self.enrich().await;
    }

    /// Clears the cache and the error, then reloads every stream from its
    /// first page.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) {
        self.cache.clear();
        self.fetcher.supersede();
        self.error = None;

        let failures = self.registry.refetch_all().await;
        self.record_stream_failures(failures);
        self.page = 1;

        self.enrich().await;
    }

    /// Runs one enrichment round over the hashes the cache cannot answer.
    #[instrument(skip(self))]
    pub async fn enrich(&mut self) -> RoundOutcome {
        let hashes = collect_transaction_hashes(self.registry.events());
        let result = self
            .fetcher
            .run_round(&hashes, &mut self.cache, Utc::now())
            .await;
        self.settle_round(result)
    }

    /// Starts an enrichment round without running it.
    ///
    /// The round owns everything it needs, so the engine stays usable while
    /// it is in flight. Loading or refreshing in the meantime supersedes it.
    pub fn begin_enrichment(&mut self) -> Option<EnrichmentRound> {
        let hashes = collect_transaction_hashes(self.registry.events());
        self.fetcher.begin_round(&hashes, &self.cache, Utc::now())
    }

    /// Applies a round started with [`Self::begin_enrichment`].
    pub fn complete_enrichment(&mut self, round: CompletedRound) -> RoundOutcome {
        let result = self.fetcher.finish_round(round, &mut self.cache, Utc::now());
        self.settle_round(result)
    }

    fn settle_round(&mut self, result: Result<RoundOutcome, FetcherError>) -> RoundOutcome {
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.record_error(format!("Failed to fetch transaction details: {e}"));
                RoundOutcome::Failed
            }
        }
    }

    fn record_stream_failures(&mut self, failures: Vec<(StreamKey, ConsumerError)>) {
        for (key, e) in failures {
            warn!(stream = %key, error = %e, "Event stream failed");
            self.record_error(format!("Failed to load {} events: {e}", key.kind));
        }
    }

    fn record_error(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // =========================================================================
    // Filter
    // =========================================================================

    pub fn update_filter(&mut self, update: FilterUpdate) {
        self.filter = self.filter.updated(update);
    }

    pub fn toggle_activity_type(&mut self, activity_type: ActivityType) {
        self.filter = self.filter.toggled(activity_type);
    }

    pub fn set_date_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.filter = self.filter.with_date_range(Some(DateRange::new(start, end)));
    }

    pub fn clear_date_range(&mut self) {
        self.filter = self.filter.with_date_range(None);
    }

    pub fn set_sorting(&mut self, sort_by: SortBy, sort_order: SortOrder) {
        self.filter = self.filter.with_sorting(sort_by, sort_order);
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    pub fn snapshot(&self) -> ActivitySnapshot {
        self.snapshot_at(Utc::now())
    }

    /// Derives the timeline as of `now`.
    ///
    /// Unresolved activities are stamped with `now`, so two calls with the
    /// same `now` and unchanged state return the same snapshot.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> ActivitySnapshot {
        let events: Vec<&RawEvent> = self.registry.events().collect();
        let ctx = ClassificationContext {
            user_address: &self.user_address,
            network: &self.config.network,
            cache: &self.cache,
            now,
        };
        let timeline = build_timeline(&events, &self.processor, &ctx, &self.filter);

        ActivitySnapshot {
            pagination: PaginationState {
                page: self.page,
                limit: self.config.page_size,
                total: timeline.activities.len(),
                has_more: self.registry.has_more(),
            },
            activities: timeline.activities,
            grouped_activities: timeline.grouped_activities,
            statistics: timeline.statistics,
            loading: self.loading(),
            error: self.error.clone(),
            filter: self.filter.clone(),
        }
    }
}
