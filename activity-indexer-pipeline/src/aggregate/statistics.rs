use std::collections::{BTreeMap, HashSet};

use activity_indexer_shared::types::{ActivityGroup, ActivityItem, ActivityStatistics};

/// Buckets activities by UTC calendar day, keeping their order. Groups appear
/// in the order of their first activity.
pub fn group_by_day(activities: &[ActivityItem]) -> Vec<ActivityGroup> {
    let mut groups: Vec<ActivityGroup> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for activity in activities {
        let date = activity.timestamp.format("%Y-%m-%d").to_string();
        match index.get(&date) {
            Some(&position) => groups[position].activities.push(activity.clone()),
            None => {
                index.insert(date.clone(), groups.len());
                groups.push(ActivityGroup {
                    date,
                    activities: vec![activity.clone()],
                });
            }
        }
    }

    groups
}

pub fn compute_statistics(activities: &[ActivityItem]) -> ActivityStatistics {
    let mut stats = ActivityStatistics {
        total_activities: activities.len(),
        ..Default::default()
    };
    let mut assets = HashSet::new();
    let mut collections = HashSet::new();

    for activity in activities {
        *stats.by_type.entry(activity.activity_type).or_default() += 1;
        *stats.by_status.entry(activity.status).or_default() += 1;
        assets.extend(activity.asset_keys());
        if let Some(collection_id) = &activity.collection_id {
            collections.insert(collection_id.as_str());
        }
        stats.total_value += activity.numeric_value();
    }

    stats.unique_assets = assets.len();
    stats.unique_collections = collections.len();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_indexer_shared::types::{ActivityMetadata, ActivityStatus, ActivityType};
    use chrono::DateTime;

    fn item(hash: &str, seconds: i64, activity_type: ActivityType) -> ActivityItem {
        ActivityItem {
            id: ActivityItem::composite_id(hash, 1),
            activity_type,
            hash: hash.to_string(),
            network: "mainnet".to_string(),
            timestamp: DateTime::from_timestamp(seconds, 0).unwrap(),
            status: ActivityStatus::Completed,
            title: String::new(),
            description: String::new(),
            asset_id: None,
            asset_ids: None,
            collection_id: None,
            from_address: None,
            to_address: None,
            value: None,
            metadata: ActivityMetadata {
                block_number: 1,
                contract_address: "0x1".to_string(),
                status: None,
            },
        }
    }

    #[test]
    fn test_unique_assets_is_set_union() {
        let mut single = item("0x1", 0, ActivityType::Mint);
        single.asset_id = Some("0x7".to_string());
        let mut batch = item("0x2", 0, ActivityType::MintBatch);
        batch.asset_ids = Some(vec!["0x7".to_string(), "0x8".to_string()]);
        let mut created = item("0x3", 0, ActivityType::CollectionCreate);
        created.collection_id = Some("0x2a".to_string());
        created.status = ActivityStatus::Pending;
        created.value = Some("not a number".to_string());

        let activities = vec![single, batch, created];
        let stats = compute_statistics(&activities);

        assert_eq!(stats.total_activities, 3);
        assert_eq!(stats.unique_assets, 2);
        assert_eq!(stats.unique_collections, 1);
        assert_eq!(stats.by_type[&ActivityType::Mint], 1);
        assert_eq!(stats.by_status[&ActivityStatus::Pending], 1);
        assert_eq!(stats.total_value, 0.0);
        assert_eq!(compute_statistics(&activities), stats);
    }

    #[test]
    fn test_group_by_day_keeps_order() {
        let day = 86_400;
        let activities = vec![
            item("0x1", 3 * day + 10, ActivityType::Mint),
            item("0x2", 3 * day + 5, ActivityType::Mint),
            item("0x3", 2 * day, ActivityType::Mint),
        ];
        let groups = group_by_day(&activities);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, "1970-01-04");
        assert_eq!(groups[0].activities.len(), 2);
        assert_eq!(groups[1].date, "1970-01-03");
    }
}
