use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use activity_indexer_cache::{CacheSource, TransactionCache};
use activity_indexer_enrichment::{EnrichmentSource, TransactionEnricher};
use activity_indexer_pipeline::consumer::{EventSource, RpcEventSource, StreamRegistry};
use activity_indexer_pipeline::orchestrator::ActivityEngine;
use tracing::{info, warn};

use crate::config::IndexerConfig;
use crate::errors::IndexingError;

/// `Dependencies` holds the wired engine and how far the binary pages.
pub struct Dependencies {
    pub engine: ActivityEngine,
    pub max_pages: u32,
}

impl Dependencies {
    /// Wires the live event source, the enricher and the session store into
    /// an `ActivityEngine`.
    pub fn new(config: &IndexerConfig) -> Result<Self, IndexingError> {
        let source: Arc<dyn EventSource> = Arc::new(RpcEventSource::new(&config.rpc_url));

        let enrichment = match &config.enrichment_url {
            Some(url) => EnrichmentSource::live(url.clone()),
            None => {
                warn!("ENRICHMENT_URL not set, transactions will not be enriched");
                EnrichmentSource::mock(HashMap::new())
            }
        };
        let enricher: Arc<dyn TransactionEnricher> = Arc::from(enrichment.into_enricher());

        let cache_source = cache_source(config.cache_dir.as_deref());

        let engine_config = config.engine_config();
        let cache = TransactionCache::init_with_ttl(cache_source.into_store(), engine_config.cache_ttl);
        let registry = StreamRegistry::standard(
            source,
            &config.factory_contract_address,
            &config.asset_contract_address,
            engine_config.from_block,
            engine_config.page_size,
        );

        info!(
            streams = registry.len(),
            cached_transactions = cache.len(),
            network = %engine_config.network,
            "Dependencies wired"
        );

        let engine = ActivityEngine::new(engine_config, &config.user_address, registry, enricher, cache)?;

        Ok(Self {
            engine,
            max_pages: config.max_pages,
        })
    }
}

/// Picks the session store backend. A cache directory that cannot be
/// created disables the store instead of failing startup.
fn cache_source(cache_dir: Option<&Path>) -> CacheSource {
    let Some(dir) = cache_dir else {
        return CacheSource::memory();
    };

    match fs::create_dir_all(dir) {
        Ok(()) => CacheSource::file(dir),
        Err(e) => {
            warn!(error = %e, dir = %dir.display(), "Cache directory unusable, transaction cache disabled");
            CacheSource::Disabled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(user_address: &str, cache_dir: Option<std::path::PathBuf>) -> IndexerConfig {
        IndexerConfig {
            rpc_url: "http://127.0.0.1:9".to_string(),
            enrichment_url: None,
            factory_contract_address: "0xfac".to_string(),
            asset_contract_address: "0xa55e7".to_string(),
            user_address: user_address.to_string(),
            network: "sepolia".to_string(),
            from_block: 0,
            page_size: 10,
            max_pages: 2,
            cache_dir,
        }
    }

    #[test]
    fn test_wires_every_stream() {
        let deps = Dependencies::new(&config("0xa11ce", None)).unwrap();
        assert_eq!(deps.engine.registry().len(), 11);
        assert_eq!(deps.engine.config().network, "sepolia");
        assert_eq!(deps.max_pages, 2);
    }

    #[test]
    fn test_invalid_engine_settings_surface_as_error() {
        assert!(matches!(
            Dependencies::new(&config(" ", None)),
            Err(IndexingError::Orchestrator(_))
        ));
    }

    #[test]
    fn test_cache_source_selection() {
        assert!(matches!(cache_source(None), CacheSource::Memory));

        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sessions");
        assert!(matches!(cache_source(Some(&nested)), CacheSource::File { .. }));
        assert!(nested.is_dir());

        let file = tempfile::NamedTempFile::new().unwrap();
        let blocked = file.path().join("sessions");
        assert!(matches!(cache_source(Some(&blocked)), CacheSource::Disabled));
    }

    #[test]
    fn test_unusable_cache_dir_still_wires_engine() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let deps = Dependencies::new(&config("0xa11ce", Some(file.path().join("sessions")))).unwrap();
        assert!(deps.engine.cache().is_empty());
    }
}
