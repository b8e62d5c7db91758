use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ActivityItem, ActivityStatus, ActivityType};

/// Aggregate figures over a computed timeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStatistics {
    pub total_activities: usize,
    pub by_type: BTreeMap<ActivityType, usize>,
    pub by_status: BTreeMap<ActivityStatus, usize>,
    pub unique_assets: usize,
    pub unique_collections: usize,
    pub total_value: f64,
}

/// Activities that happened on the same calendar day (UTC).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityGroup {
    /// `YYYY-MM-DD`
    pub date: String,
    pub activities: Vec<ActivityItem>,
}
