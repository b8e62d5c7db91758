use serde::{Deserialize, Serialize};

/// The contract an event kind is emitted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRole {
    /// Factory contract that creates collections and mints/burns through them.
    CollectionFactory,
    /// Primary asset contract holding the tokens.
    Asset,
}

/// Every ledger event kind the indexer subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // Collection factory events
    CollectionCreated,
    TokenMinted,
    TokenMintedBatch,
    TokenBurned,
    TokenBurnedBatch,
    OwnershipTransferred,

    // Asset contract events
    Transfer,
    TransferBatch,
    Approval,
    MetadataUpdate,
    Upgraded,
}

impl EventKind {
    /// All event kinds, factory events first.
    pub const ALL: [EventKind; 11] = [
        EventKind::CollectionCreated,
        EventKind::TokenMinted,
        EventKind::TokenMintedBatch,
        EventKind::TokenBurned,
        EventKind::TokenBurnedBatch,
        EventKind::OwnershipTransferred,
        EventKind::Transfer,
        EventKind::TransferBatch,
        EventKind::Approval,
        EventKind::MetadataUpdate,
        EventKind::Upgraded,
    ];

    /// Returns the event name as declared by the contract ABI.
    pub fn event_name(&self) -> &'static str {
        match self {
            EventKind::CollectionCreated => "CollectionCreated",
            EventKind::TokenMinted => "TokenMinted",
            EventKind::TokenMintedBatch => "TokenMintedBatch",
            EventKind::TokenBurned => "TokenBurned",
            EventKind::TokenBurnedBatch => "TokenBurnedBatch",
            EventKind::OwnershipTransferred => "OwnershipTransferred",

            EventKind::Transfer => "Transfer",
            EventKind::TransferBatch => "TransferBatch",
            EventKind::Approval => "Approval",
            EventKind::MetadataUpdate => "MetadataUpdate",
            EventKind::Upgraded => "Upgraded",
        }
    }

    /// Returns which contract emits this event kind.
    pub fn contract_role(&self) -> ContractRole {
        match self {
            EventKind::CollectionCreated
            | EventKind::TokenMinted
            | EventKind::TokenMintedBatch
            | EventKind::TokenBurned
            | EventKind::TokenBurnedBatch
            | EventKind::OwnershipTransferred => ContractRole::CollectionFactory,
            EventKind::Transfer
            | EventKind::TransferBatch
            | EventKind::Approval
            | EventKind::MetadataUpdate
            | EventKind::Upgraded => ContractRole::Asset,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}
