use serde::{Deserialize, Serialize};

/// Pagination state exposed to the rendering side.
///
/// `has_more` is the logical OR of every underlying stream's own flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub has_more: bool,
}
