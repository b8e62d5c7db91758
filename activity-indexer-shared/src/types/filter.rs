use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ActivityType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Timestamp,
    Type,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Inclusive time window. Both `start` and `end` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.start && *timestamp <= self.end
    }
}

/// Partial update applied to an [`ActivityFilter`].
///
/// `date_range: Some(None)` clears the range, `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub activity_types: Option<BTreeSet<ActivityType>>,
    pub date_range: Option<Option<DateRange>>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

/// Filter state of the timeline.
///
/// Every update produces a new filter value; the current one is never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFilter {
    pub activity_types: BTreeSet<ActivityType>,
    pub date_range: Option<DateRange>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl Default for ActivityFilter {
    fn default() -> Self {
        Self {
            activity_types: ActivityType::ALL.into_iter().collect(),
            date_range: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl ActivityFilter {
    pub fn all_types_selected(&self) -> bool {
        ActivityType::ALL
            .iter()
            .all(|activity_type| self.activity_types.contains(activity_type))
    }

    pub fn includes(&self, activity_type: ActivityType) -> bool {
        self.activity_types.contains(&activity_type)
    }

    pub fn updated(&self, update: FilterUpdate) -> Self {
        Self {
            activity_types: update
                .activity_types
                .unwrap_or_else(|| self.activity_types.clone()),
            date_range: update.date_range.unwrap_or(self.date_range),
            sort_by: update.sort_by.unwrap_or(self.sort_by),
            sort_order: update.sort_order.unwrap_or(self.sort_order),
        }
    }

    /// Adds the type when absent, removes it when present.
    pub fn toggled(&self, activity_type: ActivityType) -> Self {
        let mut activity_types = self.activity_types.clone();
        if !activity_types.remove(&activity_type) {
            activity_types.insert(activity_type);
        }
        self.updated(FilterUpdate {
            activity_types: Some(activity_types),
            ..Default::default()
        })
    }

    pub fn with_date_range(&self, date_range: Option<DateRange>) -> Self {
        self.updated(FilterUpdate {
            date_range: Some(date_range),
            ..Default::default()
        })
    }

    pub fn with_sorting(&self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.updated(FilterUpdate {
            sort_by: Some(sort_by),
            sort_order: Some(sort_order),
            ..Default::default()
        })
    }
}
