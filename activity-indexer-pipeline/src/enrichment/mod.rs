//! Batched enrichment of transaction metadata.
//!
//! Every cycle collects the hashes of all loaded events, keeps those the
//! cache cannot answer and issues at most one lookup round of at most
//! `batch_limit` hashes. Hashes beyond the limit wait for a later cycle.
//!
//! Rounds are tied to the generation of the event set they were started
//! for. Loading more events or refreshing bumps the generation, and a round
//! finishing for an older generation is discarded without touching the
//! cache.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use activity_indexer_cache::TransactionCache;
use activity_indexer_enrichment::{EnrichmentError, TransactionEnricher, MAX_BATCH_SIZE};
use activity_indexer_shared::felt::normalize_felt;
use activity_indexer_shared::types::{RawEvent, TransactionMetadata};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::errors::FetcherError;

/// Unique transaction hashes of `events`, newest block first.
///
/// Events without a block are pending and therefore newest.
pub fn collect_transaction_hashes<'a, I>(events: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let mut ordered: Vec<&RawEvent> = events.into_iter().collect();
    ordered.sort_by_key(|event| std::cmp::Reverse(event.block_number.unwrap_or(u64::MAX)));

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .map(|event| normalize_felt(&event.transaction_hash))
        .filter(|hash| seen.insert(hash.clone()))
        .collect()
}

/// Hashes the cache cannot answer at `now`, capped at `limit`.
pub fn hashes_needing_refresh(
    hashes: &[String],
    cache: &TransactionCache,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<String> {
    hashes
        .iter()
        .filter(|hash| cache.needs_refresh_at(hash, now))
        .take(limit)
        .cloned()
        .collect()
}

/// Outcome of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Results were written to the cache.
    Applied { resolved: usize },
    /// The inputs changed while the round was in flight.
    Discarded,
    /// Nothing to fetch, or a round is already in flight.
    Skipped,
    /// The lookup failed and the failure has been reported.
    Failed,
}

/// A lookup round that has been started but not yet sent.
///
/// Running it needs no access to the fetcher, so the owner can keep mutating
/// its state (and superseding the round) while the request is in flight.
pub struct EnrichmentRound {
    generation: u64,
    hashes: Vec<String>,
    enricher: Arc<dyn TransactionEnricher>,
}

impl EnrichmentRound {
    pub fn hashes(&self) -> &[String] {
        &self.hashes
    }

    pub async fn run(self) -> CompletedRound {
        let result = self.enricher.enrich(&self.hashes).await;
        CompletedRound {
            generation: self.generation,
            hashes: self.hashes,
            result,
        }
    }
}

/// A round whose request has settled.
pub struct CompletedRound {
    generation: u64,
    hashes: Vec<String>,
    result: Result<HashMap<String, TransactionMetadata>, EnrichmentError>,
}

/// Drives enrichment rounds and tracks whether one is in flight.
pub struct BatchEnrichmentFetcher {
    enricher: Arc<dyn TransactionEnricher>,
    batch_limit: usize,
    generation: u64,
    in_flight: Option<u64>,
}

impl BatchEnrichmentFetcher {
    pub fn new(enricher: Arc<dyn TransactionEnricher>, batch_limit: usize) -> Self {
        Self {
            enricher,
            batch_limit: batch_limit.clamp(1, MAX_BATCH_SIZE),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` while a round of the current generation is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight == Some(self.generation)
    }

    /// Invalidates every round started so far.
    pub fn supersede(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    /// Starts a round for the hashes of `hashes` the cache cannot answer.
    ///
    /// Returns `None` when there is nothing to fetch or a round of the
    /// current generation is already in flight.
    pub fn begin_round(
        &mut self,
        hashes: &[String],
        cache: &TransactionCache,
        now: DateTime<Utc>,
    ) -> Option<EnrichmentRound> {
        if self.is_loading() {
            debug!("Enrichment round already in flight");
            return None;
        }

        let pending = hashes_needing_refresh(hashes, cache, now, self.batch_limit);
        if pending.is_empty() {
            return None;
        }

        self.in_flight = Some(self.generation);
        Some(EnrichmentRound {
            generation: self.generation,
            hashes: pending,
            enricher: self.enricher.clone(),
        })
    }

    /// Applies a settled round to the cache.
    ///
    /// Rounds of an older generation are discarded, errors included.
    pub fn finish_round(
        &mut self,
        round: CompletedRound,
        cache: &mut TransactionCache,
        now: DateTime<Utc>,
    ) -> Result<RoundOutcome, FetcherError> {
        if round.generation != self.generation {
            debug!(
                round = round.generation,
                current = self.generation,
                "Discarding superseded enrichment round"
            );
            return Ok(RoundOutcome::Discarded);
        }
        self.in_flight = None;

        match round.result {
            Ok(resolved) => {
                let count = resolved.len();
                cache.put_many_at(resolved, now);
                info!(
                    requested = round.hashes.len(),
                    resolved = count,
                    "Enrichment round applied"
                );
                Ok(RoundOutcome::Applied { resolved: count })
            }
            Err(e) => {
                warn!(error = %e, requested = round.hashes.len(), "Enrichment round failed");
                Err(e.into())
            }
        }
    }

    /// Runs one complete round: begin, send, finish.
    #[instrument(skip_all, fields(candidates = hashes.len()))]
    pub async fn run_round(
        &mut self,
        hashes: &[String],
        cache: &mut TransactionCache,
        now: DateTime<Utc>,
    ) -> Result<RoundOutcome, FetcherError> {
        let Some(round) = self.begin_round(hashes, cache, now) else {
            return Ok(RoundOutcome::Skipped);
        };
        let completed = round.run().await;
        self.finish_round(completed, cache, now)
    }
}
