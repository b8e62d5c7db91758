use std::path::PathBuf;
use std::str::FromStr;

use activity_indexer_pipeline::orchestrator::EngineConfig;

use crate::errors::IndexingError;

const DEFAULT_NETWORK: &str = "mainnet";
const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_MAX_PAGES: u32 = 5;

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    pub rpc_url: String,
    /// Mock enricher when unset.
    pub enrichment_url: Option<String>,
    pub factory_contract_address: String,
    pub asset_contract_address: String,
    pub user_address: String,
    pub network: String,
    pub from_block: u64,
    pub page_size: u32,
    pub max_pages: u32,
    /// In-memory store when unset.
    pub cache_dir: Option<PathBuf>,
}

impl IndexerConfig {
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            optional(key).ok_or_else(|| IndexingError::Config(format!("{key} must be set")))
        };

        Ok(Self {
            rpc_url: required("RPC_URL")?,
            enrichment_url: optional("ENRICHMENT_URL"),
            factory_contract_address: required("FACTORY_CONTRACT_ADDRESS")?,
            asset_contract_address: required("ASSET_CONTRACT_ADDRESS")?,
            user_address: required("USER_ADDRESS")?,
            network: optional("NETWORK").unwrap_or_else(|| DEFAULT_NETWORK.to_string()),
            from_block: parse_or("FROM_BLOCK", optional("FROM_BLOCK"), 0)?,
            page_size: parse_or("PAGE_SIZE", optional("PAGE_SIZE"), DEFAULT_PAGE_SIZE)?,
            max_pages: parse_or("MAX_PAGES", optional("MAX_PAGES"), DEFAULT_MAX_PAGES)?,
            cache_dir: optional("CACHE_DIR").map(PathBuf::from),
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            network: self.network.clone(),
            from_block: self.from_block,
            page_size: self.page_size,
            ..Default::default()
        }
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, IndexingError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IndexingError::Config(format!("{key} is not a valid number: {raw}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn required_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("RPC_URL", "https://rpc.example.com"),
            ("FACTORY_CONTRACT_ADDRESS", "0xfac"),
            ("ASSET_CONTRACT_ADDRESS", "0xa55e7"),
            ("USER_ADDRESS", "0xa11ce"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = IndexerConfig::from_lookup(lookup(&required_vars())).unwrap();
        assert_eq!(config.network, "mainnet");
        assert_eq!(config.from_block, 0);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_pages, 5);
        assert!(config.enrichment_url.is_none());
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_missing_required_value() {
        let mut vars = required_vars();
        vars.retain(|(key, _)| *key != "USER_ADDRESS");
        let result = IndexerConfig::from_lookup(lookup(&vars));
        assert!(matches!(result, Err(IndexingError::Config(message)) if message.contains("USER_ADDRESS")));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut vars = required_vars();
        vars.push(("ENRICHMENT_URL", "  "));
        let config = IndexerConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.enrichment_url.is_none());
    }

    #[test]
    fn test_invalid_number() {
        let mut vars = required_vars();
        vars.push(("PAGE_SIZE", "lots"));
        assert!(matches!(
            IndexerConfig::from_lookup(lookup(&vars)),
            Err(IndexingError::Config(_))
        ));
    }

    #[test]
    fn test_engine_config_carries_overrides() {
        let mut vars = required_vars();
        vars.extend([("NETWORK", "sepolia"), ("FROM_BLOCK", "1200"), ("PAGE_SIZE", "25")]);
        let engine = IndexerConfig::from_lookup(lookup(&vars)).unwrap().engine_config();
        assert_eq!(engine.network, "sepolia");
        assert_eq!(engine.from_block, 1200);
        assert_eq!(engine.page_size, 25);
        assert_eq!(engine.enrichment_batch_limit, 100);
    }
}
