use std::collections::BTreeSet;

use super::state::SelectField;
use crate::models::{FieldValue, Listing};

/// Distinct values offered by each dropdown, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub category: Vec<String>,
    pub city: Vec<String>,
    pub property_type: Vec<String>,
    pub furnishing: Vec<String>,
    pub bedrooms: Vec<String>,
    pub availability: Vec<String>,
}

impl FilterOptions {
    /// Collect options from rows already in memory
    pub fn from_rows(rows: &[Listing]) -> Self {
        let mut options = Self::default();
        for field in SelectField::ALL {
            let values = rows.iter().filter_map(|row| match field.column().value(row) {
                FieldValue::Text(Some(v)) => Some(v.to_string()),
                _ => None,
            });
            options.set(field, values);
        }
        options
    }

    pub fn get(&self, field: SelectField) -> &[String] {
        match field {
            SelectField::Category => &self.category,
            SelectField::City => &self.city,
            SelectField::PropertyType => &self.property_type,
            SelectField::Furnishing => &self.furnishing,
            SelectField::Bedrooms => &self.bedrooms,
            SelectField::Availability => &self.availability,
        }
    }

    /// Replace one list; blanks are dropped, duplicates merged
    pub fn set(&mut self, field: SelectField, values: impl IntoIterator<Item = String>) {
        let distinct: BTreeSet<String> = values
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .collect();
        let slot = match field {
            SelectField::Category => &mut self.category,
            SelectField::City => &mut self.city,
            SelectField::PropertyType => &mut self.property_type,
            SelectField::Furnishing => &mut self.furnishing,
            SelectField::Bedrooms => &mut self.bedrooms,
            SelectField::Availability => &mut self.availability,
        };
        *slot = distinct.into_iter().collect();
    }
}
