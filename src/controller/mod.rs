pub mod catalog;
pub mod query;

pub use catalog::{
    CatalogController, Completion, DisplayedResult, EmptyState, Intent, PendingCall,
};
pub use query::{Mode, PageSize, QueryState, SortDirection, SortField, SortSpec};
