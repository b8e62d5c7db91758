//! Pure derivation of the timeline from raw events, cache and filter.
//!
//! Nothing here mutates its inputs; calling [`build_timeline`] twice with the
//! same arguments yields the same `Timeline`.
mod sort;
mod statistics;

pub use sort::sort_activities;
pub use statistics::{compute_statistics, group_by_day};

use std::collections::HashSet;

use activity_indexer_cache::TransactionCache;
use activity_indexer_shared::felt::addresses_match;
use activity_indexer_shared::types::{
    ActivityFilter, ActivityGroup, ActivityItem, ActivityStatistics, RawEvent,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::processor::{ClassificationContext, ProcessEvents};

/// Derived view over the loaded events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub activities: Vec<ActivityItem>,
    pub grouped_activities: Vec<ActivityGroup>,
    pub statistics: ActivityStatistics,
}

/// Keeps the first occurrence of every activity id.
pub fn dedupe_by_id(activities: Vec<ActivityItem>) -> Vec<ActivityItem> {
    let mut seen = HashSet::new();
    activities
        .into_iter()
        .filter(|activity| seen.insert(activity.id.clone()))
        .collect()
}

/// Whether an activity belongs on the user's timeline: the user is a party
/// to it, or the cache says the user submitted its transaction.
pub fn involves_user(
    activity: &ActivityItem,
    user_address: &str,
    cache: &TransactionCache,
    now: DateTime<Utc>,
) -> bool {
    let is_user = |address: &Option<String>| {
        address
            .as_deref()
            .is_some_and(|address| addresses_match(address, user_address))
    };

    is_user(&activity.from_address)
        || is_user(&activity.to_address)
        || cache
            .get_at(&activity.hash, now)
            .is_some_and(|entry| addresses_match(&entry.metadata.sender, user_address))
}

/// Applies the type and date restrictions of `filter`.
pub fn matches_filter(activity: &ActivityItem, filter: &ActivityFilter) -> bool {
    let type_ok = filter.all_types_selected() || filter.includes(activity.activity_type);
    let date_ok = filter
        .date_range
        .as_ref()
        .map_or(true, |range| range.contains(&activity.timestamp));
    type_ok && date_ok
}

/// Classifies, scopes, deduplicates, filters, sorts, groups and counts.
///
/// Scoping runs before deduplication so that an event of the user is never
/// shadowed by an unrelated event sharing its transaction id.
pub fn build_timeline(
    events: &[&RawEvent],
    processor: &dyn ProcessEvents,
    ctx: &ClassificationContext<'_>,
    filter: &ActivityFilter,
) -> Timeline {
    let classified = processor.process(events, ctx);
    let classified_count = classified.len();

    let scoped: Vec<ActivityItem> = classified
        .into_iter()
        .filter(|activity| involves_user(activity, ctx.user_address, ctx.cache, ctx.now))
        .collect();

    let mut activities: Vec<ActivityItem> = dedupe_by_id(scoped)
        .into_iter()
        .filter(|activity| matches_filter(activity, filter))
        .collect();

    sort_activities(&mut activities, filter.sort_by, filter.sort_order);

    debug!(
        events = events.len(),
        classified = classified_count,
        retained = activities.len(),
        "Timeline rebuilt"
    );

    Timeline {
        grouped_activities: group_by_day(&activities),
        statistics: compute_statistics(&activities),
        activities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::mock::mock_events;
    use crate::processor::ActivityProcessor;
    use activity_indexer_cache::CacheSource;
    use activity_indexer_shared::types::{
        ActivityType, DateRange, EventKind, FilterUpdate, TransactionMetadata,
    };
    use chrono::Duration;

    const ASSET: &str = "0xa55e7";
    const USER: &str = "0xa11ce";
    const OTHER: &str = "0xb0b";

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_713_859_200, 0).unwrap()
    }

    fn cache() -> TransactionCache {
        TransactionCache::init_at(CacheSource::memory().into_store(), now())
    }

    fn timeline(events: &[RawEvent], cache: &TransactionCache, filter: &ActivityFilter) -> Timeline {
        let refs: Vec<&RawEvent> = events.iter().collect();
        let ctx = ClassificationContext {
            user_address: USER,
            network: "mainnet",
            cache,
            now: now(),
        };
        build_timeline(&refs, &ActivityProcessor::default(), &ctx, filter)
    }

    #[test]
    fn test_scoping_is_case_insensitive() {
        let events = vec![
            mock_events::transfer(ASSET, "0x1", Some(1), "0xA11CE", OTHER, "0x7"),
            mock_events::transfer(ASSET, "0x2", Some(2), OTHER, "0xcafe", "0x7"),
        ];
        let result = timeline(&events, &cache(), &ActivityFilter::default());
        assert_eq!(result.activities.len(), 1);
        assert_eq!(result.activities[0].hash, "0x1");
    }

    #[test]
    fn test_cached_sender_keeps_unrelated_transfer() {
        let mut cache = cache();
        cache.put_many_at(
            [(
                "0x2".to_string(),
                TransactionMetadata {
                    timestamp: now() - Duration::minutes(5),
                    sender: "0xA11CE".to_string(),
                },
            )],
            now(),
        );
        let events = vec![mock_events::transfer(ASSET, "0x2", Some(2), OTHER, "0xcafe", "0x7")];

        let result = timeline(&events, &cache, &ActivityFilter::default());
        assert_eq!(result.activities.len(), 1);
        assert_eq!(result.activities[0].activity_type, ActivityType::TransferOut);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut approval = mock_events::transfer(ASSET, "0x1", Some(1), USER, OTHER, "0x7");
        approval.kind = EventKind::Approval;
        let events = vec![
            mock_events::transfer(ASSET, "0x1", Some(1), USER, OTHER, "0x7"),
            approval,
        ];

        let result = timeline(&events, &cache(), &ActivityFilter::default());
        assert_eq!(result.activities.len(), 1);
        assert_eq!(result.activities[0].activity_type, ActivityType::TransferOut);
    }

    #[test]
    fn test_shared_transaction_keeps_user_event() {
        let events = vec![
            mock_events::transfer(ASSET, "0x77", Some(5), OTHER, "0xcafe", "0x1"),
            mock_events::transfer(ASSET, "0x77", Some(5), OTHER, USER, "0x2"),
        ];

        let result = timeline(&events, &cache(), &ActivityFilter::default());
        assert_eq!(result.activities.len(), 1);
        assert_eq!(result.activities[0].activity_type, ActivityType::TransferIn);
        assert_eq!(result.activities[0].asset_id.as_deref(), Some("0x2"));
    }

    #[test]
    fn test_type_and_date_filters() {
        let events = vec![
            mock_events::transfer(ASSET, "0x1", Some(1), USER, OTHER, "0x7"),
            mock_events::transfer(ASSET, "0x2", Some(2), OTHER, USER, "0x8"),
        ];

        let only_incoming = ActivityFilter::default()
            .updated(FilterUpdate {
                activity_types: Some([ActivityType::TransferIn].into_iter().collect()),
                ..Default::default()
            });
        let result = timeline(&events, &cache(), &only_incoming);
        assert_eq!(result.activities.len(), 1);
        assert_eq!(result.activities[0].hash, "0x2");

        let inclusive = ActivityFilter::default().with_date_range(Some(DateRange::new(now(), now())));
        assert_eq!(timeline(&events, &cache(), &inclusive).activities.len(), 2);

        let past = ActivityFilter::default().with_date_range(Some(DateRange::new(
            now() - Duration::days(2),
            now() - Duration::days(1),
        )));
        assert!(timeline(&events, &cache(), &past).activities.is_empty());
    }

    #[test]
    fn test_empty_input_is_total() {
        let result = timeline(&[], &cache(), &ActivityFilter::default());
        assert_eq!(result, Timeline::default());
    }
}
