use crate::error::StoreError;
use crate::models::{Column, FieldValue, Listing};
use crate::store::traits::ListingStore;
use crate::store::types::{ListingPage, ListingQuery};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Listing store backed by rows held in memory
pub struct MemoryStore {
    rows: Vec<Listing>,
}

impl MemoryStore {
    pub fn new(rows: Vec<Listing>) -> Self {
        Self { rows }
    }

    /// Load a JSON array of rows, e.g. one written by `listings --output`
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Snapshot {
                path: path.to_path_buf(),
                source,
            })?;
        let rows: Vec<Listing> = serde_json::from_str(&raw)?;
        info!("📂 Loaded {} listings from {}", rows.len(), path.display());
        Ok(Self::new(rows))
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn fetch(&self, query: &ListingQuery) -> Result<ListingPage, StoreError> {
        let mut matched: Vec<Listing> = self
            .rows
            .iter()
            .filter(|row| query.conditions.iter().all(|c| c.matches(row)))
            .cloned()
            .collect();
        let total = matched.len();

        query.order.sort(&mut matched);
        matched.truncate(query.limit);

        debug!("Memory store matched {} of {} rows", total, self.rows.len());

        Ok(ListingPage {
            rows: matched,
            total: query.count_total.then_some(total),
        })
    }

    async fn distinct(&self, column: Column, limit: usize) -> Result<Vec<String>, StoreError> {
        let values: BTreeSet<&str> = self
            .rows
            .iter()
            .filter_map(|row| match column.value(row) {
                FieldValue::Text(Some(v)) if !v.trim().is_empty() => Some(v),
                _ => None,
            })
            .collect();
        Ok(values.into_iter().take(limit).map(str::to_string).collect())
    }

    fn source_name(&self) -> &'static str {
        "memory"
    }
}
