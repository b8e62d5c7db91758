//! Decoding of raw event payloads into typed fields.
//!
//! Extractors only know the *shape* of an event's flat `data`/`keys` arrays,
//! never its name. Which extractor applies to which event kind is decided by
//! the [`DecoderTable`], so a schema change touches a single row.
//!
//! Decoding never fails: missing positions yield `None` and values that are
//! not valid felts are kept in their raw string form.
use std::collections::HashMap;

use activity_indexer_shared::felt::normalize_felt;
use activity_indexer_shared::types::{EventKind, RawEvent};

/// Sender/recipient pair of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addresses {
    pub from_address: Option<String>,
    pub to_address: Option<String>,
}

/// Typed fields extracted from one raw event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFields {
    pub asset_id: Option<String>,
    pub asset_ids: Option<Vec<String>>,
    pub collection_id: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub class_hash: Option<String>,
}

impl DecodedFields {
    fn with_addresses(mut self, addresses: Addresses) -> Self {
        self.from_address = addresses.from_address;
        self.to_address = addresses.to_address;
        self
    }
}

fn felt_at(values: &[String], index: usize) -> Option<String> {
    values.get(index).map(|value| normalize_felt(value))
}

/// Token id of an event: `data[2]` for `(from, to, token_id)` events,
/// `data[0]` for id-only events.
pub fn extract_token_id(data: &[String]) -> Option<String> {
    if data.len() > 2 {
        felt_at(data, 2)
    } else {
        felt_at(data, 0)
    }
}

/// Token ids of a batch event laid out as `(from, to, id...)`.
///
/// Falls back to a singleton from [`extract_token_id`] when the payload is
/// too short to hold an id list.
pub fn extract_token_ids(data: &[String]) -> Vec<String> {
    if data.len() > 3 {
        data[2..].iter().map(|value| normalize_felt(value)).collect()
    } else {
        extract_token_id(data).into_iter().collect()
    }
}

/// Addresses of a non-keyed event: `data[0]` and `data[1]`.
pub fn extract_addresses(data: &[String]) -> Addresses {
    Addresses {
        from_address: felt_at(data, 0),
        to_address: felt_at(data, 1),
    }
}

/// Addresses of a keyed event: `keys[1]` and `keys[2]` (`keys[0]` is the
/// event selector).
pub fn extract_keyed_addresses(keys: &[String]) -> Addresses {
    Addresses {
        from_address: felt_at(keys, 1),
        to_address: felt_at(keys, 2),
    }
}

/// Keyed events carry the selector plus both parties in `keys`.
fn is_keyed(event: &RawEvent) -> bool {
    event.keys.len() >= 3
}

// =============================================================================
// Decoder rows
// =============================================================================

/// `CollectionCreated(collection_id, creator, ...)`
pub fn decode_collection_created(event: &RawEvent) -> DecodedFields {
    DecodedFields {
        collection_id: felt_at(&event.data, 0),
        to_address: felt_at(&event.data, 1),
        ..Default::default()
    }
}

/// `(from, to, token_id)` or `(token_id)` events.
pub fn decode_transfer_shaped(event: &RawEvent) -> DecodedFields {
    let fields = DecodedFields {
        asset_id: extract_token_id(&event.data),
        ..Default::default()
    };

    if event.data.len() > 2 {
        fields.with_addresses(extract_addresses(&event.data))
    } else {
        fields
    }
}

/// `(from, to, id...)` events.
pub fn decode_batch_shaped(event: &RawEvent) -> DecodedFields {
    let fields = DecodedFields {
        asset_ids: Some(extract_token_ids(&event.data)),
        ..Default::default()
    };

    if event.data.len() >= 2 {
        fields.with_addresses(extract_addresses(&event.data))
    } else {
        fields
    }
}

/// Transfer and approval events put both parties in `keys` and the token id
/// either in `data` or right after the parties in `keys`. Legacy contracts
/// emit the non-keyed layout instead.
pub fn decode_keyed_transfer(event: &RawEvent) -> DecodedFields {
    if !is_keyed(event) {
        return decode_transfer_shaped(event);
    }

    DecodedFields {
        asset_id: extract_token_id(&event.data).or_else(|| felt_at(&event.keys, 3)),
        ..Default::default()
    }
    .with_addresses(extract_keyed_addresses(&event.keys))
}

/// `OwnershipTransferred(previous_owner, new_owner)`
pub fn decode_ownership_transferred(event: &RawEvent) -> DecodedFields {
    let addresses = if is_keyed(event) {
        extract_keyed_addresses(&event.keys)
    } else {
        extract_addresses(&event.data)
    };
    DecodedFields::default().with_addresses(addresses)
}

/// `MetadataUpdate(token_id)`
pub fn decode_metadata_update(event: &RawEvent) -> DecodedFields {
    DecodedFields {
        asset_id: extract_token_id(&event.data),
        ..Default::default()
    }
}

/// `Upgraded(class_hash)`
pub fn decode_upgraded(event: &RawEvent) -> DecodedFields {
    DecodedFields {
        class_hash: felt_at(&event.data, 0),
        ..Default::default()
    }
}

// =============================================================================
// Decoder table
// =============================================================================

/// Pure decoding function of one table row.
pub type DecodeFn = fn(&RawEvent) -> DecodedFields;

/// Maps every event kind to the function decoding its payload.
pub struct DecoderTable {
    rows: HashMap<EventKind, DecodeFn>,
}

impl DecoderTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    /// Creates the table covering every subscribed event kind.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(EventKind::CollectionCreated, decode_collection_created);
        table.register(EventKind::TokenMinted, decode_transfer_shaped);
        table.register(EventKind::TokenMintedBatch, decode_batch_shaped);
        table.register(EventKind::TokenBurned, decode_transfer_shaped);
        table.register(EventKind::TokenBurnedBatch, decode_batch_shaped);
        table.register(EventKind::OwnershipTransferred, decode_ownership_transferred);
        table.register(EventKind::Transfer, decode_keyed_transfer);
        table.register(EventKind::TransferBatch, decode_batch_shaped);
        table.register(EventKind::Approval, decode_keyed_transfer);
        table.register(EventKind::MetadataUpdate, decode_metadata_update);
        table.register(EventKind::Upgraded, decode_upgraded);
        table
    }

    /// Registers (or replaces) the decoder of an event kind.
    pub fn register(&mut self, kind: EventKind, decode: DecodeFn) {
        self.rows.insert(kind, decode);
    }

    /// Decodes an event. Kinds without a row decode to empty fields.
    pub fn decode(&self, event: &RawEvent) -> DecodedFields {
        self.rows
            .get(&event.kind)
            .map(|decode| decode(event))
            .unwrap_or_default()
    }
}

impl Default for DecoderTable {
    fn default() -> Self {
        Self::standard()
    }
}
