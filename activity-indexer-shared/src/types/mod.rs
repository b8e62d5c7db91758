mod activity;
mod event_kind;
mod filter;
mod pagination;
mod raw_event;
mod statistics;
mod transaction_metadata;

pub use activity::{ActivityItem, ActivityMetadata, ActivityStatus, ActivityType};
pub use event_kind::{ContractRole, EventKind};
pub use filter::{ActivityFilter, DateRange, FilterUpdate, SortBy, SortOrder};
pub use pagination::PaginationState;
pub use raw_event::RawEvent;
pub use statistics::{ActivityGroup, ActivityStatistics};
pub use transaction_metadata::TransactionMetadata;
