//! Filter state to conditions, and condition evaluation against a listing.

use super::parse::parse_amount;
use super::state::{FilterState, FlagField, RangeField, SelectField, TextField};
use crate::models::{Column, FieldValue, Listing};
use crate::store::types::Condition;

/// Trimmed term, or `None` when the box is blank
fn term(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl FilterState {
    /// The active criteria; blank inputs contribute nothing
    pub fn conditions(&self) -> Vec<Condition> {
        let mut conditions = Vec::new();

        if let Some(search) = term(&self.search) {
            conditions.push(Condition::AnyContains(
                Column::SEARCHABLE.to_vec(),
                search.to_string(),
            ));
        }

        for field in TextField::ALL {
            if let Some(value) = term(self.text(field)) {
                conditions.push(Condition::Contains(field.column(), value.to_string()));
            }
        }

        for field in SelectField::ALL {
            let selected = self.selection(field);
            if term(selected).is_some() {
                conditions.push(Condition::Equals(field.column(), selected.to_string()));
            }
        }

        for field in FlagField::ALL {
            if let Some(wanted) = self.flag(field).wanted() {
                conditions.push(Condition::Is(field.column(), wanted));
            }
        }

        for field in RangeField::ALL {
            let range = self.range(field);
            if let Some(min) = parse_amount(&range.min) {
                conditions.push(Condition::AtLeast(field.column(), min));
            }
            if let Some(max) = parse_amount(&range.max) {
                conditions.push(Condition::AtMost(field.column(), max));
            }
        }

        conditions
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.conditions().iter().all(|c| c.matches(listing))
    }
}

impl Condition {
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Condition::Equals(column, wanted) => match column.value(listing) {
                FieldValue::Text(Some(value)) => value == wanted.as_str(),
                _ => false,
            },
            Condition::Is(column, wanted) => match column.value(listing) {
                FieldValue::Bool(Some(value)) => value == *wanted,
                _ => false,
            },
            Condition::Contains(column, needle) => {
                let needle = needle.to_lowercase();
                text_contains(listing, *column, &needle)
            }
            Condition::AnyContains(columns, needle) => {
                let needle = needle.to_lowercase();
                columns.iter().any(|c| text_contains(listing, *c, &needle))
            }
            Condition::AtLeast(column, bound) => match column.value(listing) {
                FieldValue::Number(Some(value)) => value >= *bound,
                _ => false,
            },
            Condition::AtMost(column, bound) => match column.value(listing) {
                FieldValue::Number(Some(value)) => value <= *bound,
                _ => false,
            },
        }
    }
}

fn text_contains(listing: &Listing, column: Column, needle_lower: &str) -> bool {
    match column.value(listing) {
        FieldValue::Text(Some(value)) => contains_ci(value, needle_lower),
        _ => false,
    }
}
