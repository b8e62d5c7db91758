//! Human-readable title and description of an activity.
//!
//! Text is produced once, at classification time, from the activity type
//! and whichever id fields were decoded.
use activity_indexer_shared::felt::shorten_address;
use activity_indexer_shared::types::{ActivityType, EventKind};

use crate::decoder::DecodedFields;

fn asset_label(decoded: &DecodedFields) -> Option<String> {
    decoded
        .asset_id
        .clone()
        .or_else(|| decoded.asset_ids.as_ref().and_then(|ids| ids.first().cloned()))
}

fn asset_count(decoded: &DecodedFields) -> usize {
    match (&decoded.asset_ids, &decoded.asset_id) {
        (Some(ids), _) => ids.len(),
        (None, Some(_)) => 1,
        (None, None) => 0,
    }
}

fn party(address: &Option<String>) -> String {
    address
        .as_deref()
        .map(shorten_address)
        .unwrap_or_else(|| "unknown".to_string())
}

fn single(verb: &str, decoded: &DecodedFields) -> String {
    match asset_label(decoded) {
        Some(id) => format!("{verb} asset #{id}"),
        None => format!("{verb} asset"),
    }
}

fn batch(verb: &str, decoded: &DecodedFields) -> String {
    format!("{verb} {} assets", asset_count(decoded))
}

/// Returns `(title, description)` for an activity.
pub fn describe(kind: EventKind, activity_type: ActivityType, decoded: &DecodedFields) -> (String, String) {
    let from = party(&decoded.from_address);
    let to = party(&decoded.to_address);

    match activity_type {
        ActivityType::Mint => (single("Minted", decoded), format!("Minted to {to}")),
        ActivityType::MintBatch => (batch("Minted", decoded), format!("Batch minted to {to}")),
        ActivityType::TransferOut => (single("Sent", decoded), format!("Transferred to {to}")),
        ActivityType::TransferIn => (single("Received", decoded), format!("Received from {from}")),
        ActivityType::TransferBatch => (
            batch("Transferred", decoded),
            format!("Batch transfer from {from} to {to}"),
        ),
        ActivityType::Burn => (single("Burned", decoded), format!("Burned by {from}")),
        ActivityType::BurnBatch => (batch("Burned", decoded), format!("Batch burned by {from}")),
        ActivityType::CollectionCreate => {
            let title = match &decoded.collection_id {
                Some(id) => format!("Created collection #{id}"),
                None => "Created collection".to_string(),
            };
            (title, format!("Collection created by {to}"))
        }
        ActivityType::Update => match kind {
            EventKind::OwnershipTransferred => (
                "Ownership transferred".to_string(),
                format!("Ownership moved from {from} to {to}"),
            ),
            EventKind::Approval => (single("Approved", decoded), format!("Approval granted to {to}")),
            _ => (single("Updated", decoded), "Metadata updated".to_string()),
        },
        ActivityType::Upgrade => {
            let description = match &decoded.class_hash {
                Some(class_hash) => format!("Upgraded to class {}", shorten_address(class_hash)),
                None => "Contract implementation upgraded".to_string(),
            };
            ("Contract upgraded".to_string(), description)
        }
        ActivityType::Sale => (single("Sold", decoded), format!("Sold to {to}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_title_counts_assets() {
        let decoded = DecodedFields {
            asset_ids: Some(vec!["0x1".to_string(), "0x2".to_string(), "0x3".to_string()]),
            from_address: Some("0x0".to_string()),
            to_address: Some("0x4a3c1e9f0b7d2a55e8c6f13b9d0e7a2c4f6b8d01".to_string()),
            ..Default::default()
        };
        let (title, description) = describe(EventKind::TransferBatch, ActivityType::MintBatch, &decoded);
        assert_eq!(title, "Minted 3 assets");
        assert_eq!(description, "Batch minted to 0x4a3c...8d01");
    }

    #[test]
    fn test_missing_fields_degrade_gracefully() {
        let (title, description) = describe(EventKind::Transfer, ActivityType::TransferIn, &DecodedFields::default());
        assert_eq!(title, "Received asset");
        assert_eq!(description, "Received from unknown");
    }
}
