use crate::error::StoreError;
use crate::models::Column;
use crate::store::types::{ListingPage, ListingQuery};
use async_trait::async_trait;

/// Read-only source of listing rows
/// Lets the engine run against the hosted table or a local snapshot alike
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Run a filtered, ordered, limited read
    async fn fetch(&self, query: &ListingQuery) -> Result<ListingPage, StoreError>;

    /// Distinct non-empty values of a text column across the whole table
    async fn distinct(&self, column: Column, limit: usize) -> Result<Vec<String>, StoreError>;

    /// Get the name of the store backend
    fn source_name(&self) -> &'static str;
}
