use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally resolved details of a transaction, keyed by its hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMetadata {
    #[serde(rename = "timestampIso")]
    pub timestamp: DateTime<Utc>,
    pub sender: String,
}
