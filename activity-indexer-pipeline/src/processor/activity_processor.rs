use activity_indexer_shared::felt::{addresses_match, is_zero_address};
use activity_indexer_shared::types::{
    ActivityItem, ActivityMetadata, ActivityStatus, ActivityType, EventKind, RawEvent,
};

use crate::decoder::{DecodedFields, DecoderTable};
use crate::processor::{describe, ClassificationContext, ProcessEvents};

/// Finality hint attached to activities already included in a block.
const ACCEPTED_STATUS: &str = "ACCEPTED_ON_L2";
const PENDING_STATUS: &str = "PENDING";

/// `ActivityProcessor` turns raw events into `ActivityItem`s.
///
/// Payloads are decoded through the `DecoderTable`; the activity type is then
/// resolved from the event kind, the decoded parties and the user address.
pub struct ActivityProcessor {
    decoders: DecoderTable,
}

impl ActivityProcessor {
    pub fn new(decoders: DecoderTable) -> Self {
        Self { decoders }
    }

    /// Classifies a single event.
    pub fn classify(&self, event: &RawEvent, ctx: &ClassificationContext<'_>) -> ActivityItem {
        let decoded = self.decoders.decode(event);
        let activity_type = resolve_activity_type(event.kind, &decoded, ctx.user_address);
        let (title, description) = describe(event.kind, activity_type, &decoded);

        let block_number = event.block_number.unwrap_or(0);
        let (status, finality) = match event.block_number {
            Some(_) => (ActivityStatus::Completed, ACCEPTED_STATUS),
            None => (ActivityStatus::Pending, PENDING_STATUS),
        };

        let timestamp = ctx
            .cache
            .get_at(&event.transaction_hash, ctx.now)
            .map(|entry| entry.metadata.timestamp)
            .unwrap_or(ctx.now);

        let DecodedFields {
            asset_id,
            asset_ids,
            collection_id,
            from_address,
            to_address,
            ..
        } = decoded;

        let (asset_id, asset_ids) = if activity_type.is_batch() {
            (None, asset_ids.or_else(|| asset_id.map(|id| vec![id])))
        } else {
            (asset_id.or_else(|| asset_ids.and_then(|ids| ids.into_iter().next())), None)
        };

        ActivityItem {
            id: ActivityItem::composite_id(&event.transaction_hash, block_number),
            activity_type,
            hash: event.transaction_hash.clone(),
            network: ctx.network.to_string(),
            timestamp,
            status,
            title,
            description,
            asset_id,
            asset_ids,
            collection_id,
            from_address,
            to_address,
            value: None,
            metadata: ActivityMetadata {
                block_number,
                contract_address: event.contract_address.clone(),
                status: Some(finality.to_string()),
            },
        }
    }
}

impl Default for ActivityProcessor {
    fn default() -> Self {
        Self::new(DecoderTable::standard())
    }
}

impl ProcessEvents for ActivityProcessor {
    fn process(&self, events: &[&RawEvent], ctx: &ClassificationContext<'_>) -> Vec<ActivityItem> {
        events.iter().map(|event| self.classify(event, ctx)).collect()
    }
}

fn is_zero(address: &Option<String>) -> bool {
    address.as_deref().is_some_and(is_zero_address)
}

fn is_user(address: &Option<String>, user_address: &str) -> bool {
    address
        .as_deref()
        .is_some_and(|address| addresses_match(address, user_address))
}

/// Resolves the semantic type of an event.
///
/// Factory events map directly. Plain transfers use the zero-address
/// sentinel (from zero is a mint, to zero is a burn) and otherwise the
/// direction relative to the user. A transfer touching neither side of the
/// user resolves to `transfer_out`; such items only survive user scoping when
/// the user submitted the transaction.
pub fn resolve_activity_type(kind: EventKind, decoded: &DecodedFields, user_address: &str) -> ActivityType {
    match kind {
        EventKind::CollectionCreated => ActivityType::CollectionCreate,
        EventKind::TokenMinted => ActivityType::Mint,
        EventKind::TokenMintedBatch => ActivityType::MintBatch,
        EventKind::TokenBurned => ActivityType::Burn,
        EventKind::TokenBurnedBatch => ActivityType::BurnBatch,
        EventKind::Transfer => {
            if is_zero(&decoded.from_address) {
                ActivityType::Mint
            } else if is_zero(&decoded.to_address) {
                ActivityType::Burn
            } else if is_user(&decoded.to_address, user_address) {
                ActivityType::TransferIn
            } else {
                ActivityType::TransferOut
            }
        }
        EventKind::TransferBatch => {
            if is_zero(&decoded.from_address) {
                ActivityType::MintBatch
            } else if is_zero(&decoded.to_address) {
                ActivityType::BurnBatch
            } else {
                ActivityType::TransferBatch
            }
        }
        EventKind::OwnershipTransferred | EventKind::Approval | EventKind::MetadataUpdate => {
            ActivityType::Update
        }
        EventKind::Upgraded => ActivityType::Upgrade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::mock::mock_events;
    use activity_indexer_cache::{CacheSource, TransactionCache};
    use activity_indexer_shared::types::TransactionMetadata;
    use chrono::{DateTime, Duration, Utc};

    const ASSET: &str = "0xa55e7";
    const USER: &str = "0xa11ce";
    const OTHER: &str = "0xb0b";

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_713_859_200, 0).unwrap()
    }

    fn classify(event: &RawEvent, cache: &TransactionCache) -> ActivityItem {
        let ctx = ClassificationContext {
            user_address: USER,
            network: "mainnet",
            cache,
            now: now(),
        };
        ActivityProcessor::default().classify(event, &ctx)
    }

    fn empty_cache() -> TransactionCache {
        TransactionCache::init_at(CacheSource::memory().into_store(), now())
    }

    #[test]
    fn test_transfer_direction() {
        let cache = empty_cache();
        let incoming = classify(&mock_events::transfer(ASSET, "0x1", Some(5), OTHER, USER, "0x7"), &cache);
        assert_eq!(incoming.activity_type, ActivityType::TransferIn);
        assert_eq!(incoming.asset_id.as_deref(), Some("0x7"));

        let outgoing = classify(&mock_events::transfer(ASSET, "0x2", Some(5), USER, OTHER, "0x7"), &cache);
        assert_eq!(outgoing.activity_type, ActivityType::TransferOut);

        let unrelated = classify(&mock_events::transfer(ASSET, "0x3", Some(5), OTHER, "0xcafe", "0x7"), &cache);
        assert_eq!(unrelated.activity_type, ActivityType::TransferOut);
    }

    #[test]
    fn test_zero_sentinel_wins_over_direction() {
        let cache = empty_cache();
        let mint = classify(&mock_events::transfer(ASSET, "0x1", Some(5), "0x0", USER, "0x7"), &cache);
        assert_eq!(mint.activity_type, ActivityType::Mint);

        let burn = classify(&mock_events::transfer(ASSET, "0x2", Some(5), USER, "0x000", "0x7"), &cache);
        assert_eq!(burn.activity_type, ActivityType::Burn);

        let batch = classify(
            &mock_events::transfer_batch(ASSET, "0x3", Some(5), "0x0", USER, &["0x1", "0x2"]),
            &cache,
        );
        assert_eq!(batch.activity_type, ActivityType::MintBatch);
        assert_eq!(batch.asset_ids, Some(vec!["0x1".to_string(), "0x2".to_string()]));
        assert!(batch.asset_id.is_none());
    }

    #[test]
    fn test_pending_event_without_block() {
        let item = classify(&mock_events::metadata_update(ASSET, "0x1", None, "0x7"), &empty_cache());
        assert_eq!(item.status, ActivityStatus::Pending);
        assert_eq!(item.id, "0x1-0");
        assert_eq!(item.block_number(), 0);
        assert_eq!(item.activity_type, ActivityType::Update);
    }

    #[test]
    fn test_timestamp_from_cache_or_now() {
        let mut cache = empty_cache();
        let submitted = now() - Duration::hours(3);
        cache.put_many_at(
            [(
                "0x1".to_string(),
                TransactionMetadata {
                    timestamp: submitted,
                    sender: USER.to_string(),
                },
            )],
            now(),
        );

        let resolved = classify(&mock_events::transfer(ASSET, "0x1", Some(5), OTHER, USER, "0x7"), &cache);
        assert_eq!(resolved.timestamp, submitted);

        let unresolved = classify(&mock_events::transfer(ASSET, "0x2", Some(5), OTHER, USER, "0x7"), &cache);
        assert_eq!(unresolved.timestamp, now());
    }

    #[test]
    fn test_collection_created() {
        let item = classify(
            &mock_events::collection_created("0xfac", "0x1", Some(3), "0x2a", USER),
            &empty_cache(),
        );
        assert_eq!(item.activity_type, ActivityType::CollectionCreate);
        assert_eq!(item.collection_id.as_deref(), Some("0x2a"));
        assert_eq!(item.to_address.as_deref(), Some(USER));
        assert_eq!(item.title, "Created collection #0x2a");
    }

    #[test]
    fn test_sale_is_never_produced() {
        let decoded = DecodedFields::default();
        for kind in EventKind::ALL {
            assert_ne!(resolve_activity_type(kind, &decoded, USER), ActivityType::Sale);
        }
    }
}
