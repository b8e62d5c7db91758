use crate::types::EventKind;

/// A ledger event exactly as returned by an event query, before decoding.
///
/// `keys` and `data` are the flat felt arrays of the emitted event. Their
/// layout depends on the event's shape, which is resolved by the decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub contract_address: String,
    pub transaction_hash: String,
    /// `None` while the event sits in a pending block.
    pub block_number: Option<u64>,
    pub keys: Vec<String>,
    pub data: Vec<String>,
}
