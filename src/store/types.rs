use serde::{Deserialize, Serialize};

use crate::filter::sort::SortState;
use crate::models::{Column, Listing};

/// Default row cap when the whole inventory is filtered in memory
pub const SNAPSHOT_ROW_CAP: usize = 5000;

/// Default row cap for live queries
pub const LIVE_ROW_CAP: usize = 1000;

/// A single predicate the store can evaluate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Exact text equality
    Equals(Column, String),
    /// Exact boolean equality; absent never matches
    Is(Column, bool),
    /// Case-insensitive substring
    Contains(Column, String),
    /// Case-insensitive substring in any of the columns
    AnyContains(Vec<Column>, String),
    /// Value present and >= bound
    AtLeast(Column, f64),
    /// Value present and <= bound
    AtMost(Column, f64),
}

/// Read against the listings table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingQuery {
    pub conditions: Vec<Condition>,
    pub order: SortState,
    pub limit: usize,
    /// Ask the store for the exact number of matching rows
    pub count_total: bool,
}

impl ListingQuery {
    /// Unfiltered newest-first snapshot
    pub fn snapshot(limit: usize) -> Self {
        Self {
            conditions: Vec::new(),
            order: SortState::default(),
            limit,
            count_total: false,
        }
    }
}

/// Rows returned by a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub rows: Vec<Listing>,
    /// Exact match count when it was requested and the store reported it
    pub total: Option<usize>,
}
