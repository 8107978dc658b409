//! Column ordering for the listings table.
//!
//! An absent value is the lowest value of every column kind: it sorts first
//! ascending and last descending, so flipping the direction reverses the
//! order exactly.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{Column, FieldValue, Listing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }
}

/// The single active sort column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Column,
    pub direction: SortDirection,
}

impl Default for SortState {
    /// Most recently updated first
    fn default() -> Self {
        Self {
            column: Column::UpdatedAt,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    pub fn new(column: Column, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Header click: flip the active column, or switch to a new one ascending
    pub fn toggle(&mut self, column: Column) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        let ordering = compare_values(self.column.value(a), self.column.value(b));
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn sort(&self, rows: &mut [Listing]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}

/// Ascending comparison of two values of the same column
pub fn compare_values(a: FieldValue<'_>, b: FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Text(a), FieldValue::Text(b)) => compare_text(a, b),
        (FieldValue::Number(a), FieldValue::Number(b)) => compare_number(a, b),
        // None < Some(false) < Some(true)
        (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(&b),
        (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

fn compare_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

fn compare_number(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.unwrap_or(f64::NEG_INFINITY);
    let b = b.unwrap_or(f64::NEG_INFINITY);
    a.total_cmp(&b)
}
