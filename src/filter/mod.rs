pub mod options;
pub mod parse;
pub mod predicate;
pub mod sort;
pub mod state;

pub use options::FilterOptions;
pub use sort::{SortDirection, SortState};
pub use state::{
    FilterAction, FilterState, FlagField, RangeField, RangeInput, SelectField, TextField,
    TriState, ViewState,
};

use crate::models::Listing;

/// Filter and order an in-memory record set. The input is left untouched.
pub fn apply(rows: &[Listing], view: &ViewState) -> Vec<Listing> {
    let conditions = view.filters.conditions();
    let mut matched: Vec<Listing> = rows
        .iter()
        .filter(|row| conditions.iter().all(|c| c.matches(row)))
        .cloned()
        .collect();
    view.sort.sort(&mut matched);
    matched
}
