use std::cmp::Ordering;

use activity_indexer_shared::types::{ActivityItem, SortBy, SortOrder};

fn by_time(a: &ActivityItem, b: &ActivityItem) -> Ordering {
    a.timestamp_millis()
        .cmp(&b.timestamp_millis())
        .then_with(|| a.block_number().cmp(&b.block_number()))
}

fn compare(a: &ActivityItem, b: &ActivityItem, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Timestamp => by_time(a, b),
        SortBy::Type => a
            .activity_type
            .as_str()
            .cmp(b.activity_type.as_str())
            .then_with(|| by_time(a, b)),
        SortBy::Value => a
            .numeric_value()
            .total_cmp(&b.numeric_value())
            .then_with(|| by_time(a, b)),
    }
}

/// Sorts in place. The order applies to the primary key and to every
/// tie-break alike; the sort is stable.
pub fn sort_activities(activities: &mut [ActivityItem], sort_by: SortBy, sort_order: SortOrder) {
    activities.sort_by(|a, b| match sort_order {
        SortOrder::Asc => compare(a, b, sort_by),
        SortOrder::Desc => compare(b, a, sort_by),
    });
}
