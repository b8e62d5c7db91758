use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic type of an activity. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Mint,
    MintBatch,
    TransferOut,
    TransferIn,
    TransferBatch,
    Burn,
    BurnBatch,
    CollectionCreate,
    Update,
    Upgrade,
    Sale,
}

impl ActivityType {
    pub const ALL: [ActivityType; 11] = [
        ActivityType::Mint,
        ActivityType::MintBatch,
        ActivityType::TransferOut,
        ActivityType::TransferIn,
        ActivityType::TransferBatch,
        ActivityType::Burn,
        ActivityType::BurnBatch,
        ActivityType::CollectionCreate,
        ActivityType::Update,
        ActivityType::Upgrade,
        ActivityType::Sale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Mint => "mint",
            ActivityType::MintBatch => "mint_batch",
            ActivityType::TransferOut => "transfer_out",
            ActivityType::TransferIn => "transfer_in",
            ActivityType::TransferBatch => "transfer_batch",
            ActivityType::Burn => "burn",
            ActivityType::BurnBatch => "burn_batch",
            ActivityType::CollectionCreate => "collection_create",
            ActivityType::Update => "update",
            ActivityType::Upgrade => "upgrade",
            ActivityType::Sale => "sale",
        }
    }

    /// Batch variants carry `asset_ids`, singular variants carry `asset_id`.
    pub fn is_batch(&self) -> bool {
        matches!(
            self,
            ActivityType::MintBatch | ActivityType::TransferBatch | ActivityType::BurnBatch
        )
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Completed,
    Pending,
    Failed,
}

/// Opaque pass-through data for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetadata {
    pub block_number: u64,
    pub contract_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// One semantic occurrence on a user's timeline.
///
/// Title and description are committed at classification time and are never
/// regenerated downstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub hash: String,
    pub network: String,
    pub timestamp: DateTime<Utc>,
    pub status: ActivityStatus,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub metadata: ActivityMetadata,
}

impl ActivityItem {
    /// Builds the dedup key of an activity from its transaction hash and block.
    pub fn composite_id(hash: &str, block_number: u64) -> String {
        format!("{hash}-{block_number}")
    }

    pub fn block_number(&self) -> u64 {
        self.metadata.block_number
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Numeric value of the activity; absent or non-numeric values count as 0.
    pub fn numeric_value(&self) -> f64 {
        self.value
            .as_deref()
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }

    /// Every asset id referenced by the activity, singular or batch.
    pub fn asset_keys(&self) -> impl Iterator<Item = &str> {
        self.asset_id
            .iter()
            .map(String::as_str)
            .chain(self.asset_ids.iter().flatten().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(value: Option<&str>) -> ActivityItem {
        ActivityItem {
            id: ActivityItem::composite_id("0xabc", 7),
            activity_type: ActivityType::Mint,
            hash: "0xabc".to_string(),
            network: "mainnet".to_string(),
            timestamp: DateTime::from_timestamp(1_713_859_200, 0).unwrap(),
            status: ActivityStatus::Completed,
            title: "Minted asset #0x7".to_string(),
            description: String::new(),
            asset_id: Some("0x7".to_string()),
            asset_ids: None,
            collection_id: None,
            from_address: None,
            to_address: None,
            value: value.map(str::to_string),
            metadata: ActivityMetadata {
                block_number: 7,
                contract_address: "0x1".to_string(),
                status: None,
            },
        }
    }

    #[test]
    fn test_composite_id() {
        assert_eq!(item(None).id, "0xabc-7");
    }

    #[test]
    fn test_numeric_value_defaults_to_zero() {
        assert_eq!(item(None).numeric_value(), 0.0);
        assert_eq!(item(Some("abc")).numeric_value(), 0.0);
        assert_eq!(item(Some("1.5")).numeric_value(), 1.5);
    }

    #[test]
    fn test_serializes_type_and_camel_case_fields() {
        let json = serde_json::to_value(item(None)).unwrap();
        assert_eq!(json["type"], "mint");
        assert_eq!(json["assetId"], "0x7");
        assert_eq!(json["metadata"]["blockNumber"], 7);
        assert!(json.get("assetIds").is_none());
    }

    #[test]
    fn test_asset_keys_covers_both_forms() {
        let mut batch = item(None);
        batch.asset_id = None;
        batch.asset_ids = Some(vec!["0x1".to_string(), "0x2".to_string()]);
        assert_eq!(batch.asset_keys().collect::<Vec<_>>(), vec!["0x1", "0x2"]);
        assert_eq!(item(None).asset_keys().collect::<Vec<_>>(), vec!["0x7"]);
    }
}
