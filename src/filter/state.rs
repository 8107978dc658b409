use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::sort::SortState;
use crate::models::Column;

/// Unset / yes / no selection for a boolean column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    #[default]
    Any,
    Yes,
    No,
}

impl TriState {
    pub fn wanted(self) -> Option<bool> {
        match self {
            TriState::Any => None,
            TriState::Yes => Some(true),
            TriState::No => Some(false),
        }
    }
}

impl FromStr for TriState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "any" | "all" => Ok(TriState::Any),
            "true" | "yes" | "y" => Ok(TriState::Yes),
            "false" | "no" | "n" => Ok(TriState::No),
            other => Err(format!("expected any, true or false, got {other}")),
        }
    }
}

/// Free-text min/max pair, parsed only when conditions are built
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeInput {
    pub min: String,
    pub max: String,
}

/// Columns filtered by case-insensitive substring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Code,
    Caption,
    PropertyName,
    FloorNumber,
    UnitNumber,
    Parking,
}

/// Columns filtered by exact dropdown selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectField {
    Category,
    City,
    PropertyType,
    Furnishing,
    Bedrooms,
    Availability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagField {
    WithBalcony,
    PetFriendly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Area,
    Lease,
    Sale,
}

impl TextField {
    pub const ALL: [TextField; 6] = [
        TextField::Code,
        TextField::Caption,
        TextField::PropertyName,
        TextField::FloorNumber,
        TextField::UnitNumber,
        TextField::Parking,
    ];

    pub fn column(self) -> Column {
        match self {
            TextField::Code => Column::Code,
            TextField::Caption => Column::Caption,
            TextField::PropertyName => Column::PropertyName,
            TextField::FloorNumber => Column::FloorNumber,
            TextField::UnitNumber => Column::UnitNumber,
            TextField::Parking => Column::Parking,
        }
    }
}

impl SelectField {
    pub const ALL: [SelectField; 6] = [
        SelectField::Category,
        SelectField::City,
        SelectField::PropertyType,
        SelectField::Furnishing,
        SelectField::Bedrooms,
        SelectField::Availability,
    ];

    pub fn column(self) -> Column {
        match self {
            SelectField::Category => Column::Category,
            SelectField::City => Column::City,
            SelectField::PropertyType => Column::PropertyType,
            SelectField::Furnishing => Column::Furnishing,
            SelectField::Bedrooms => Column::Bedrooms,
            SelectField::Availability => Column::Availability,
        }
    }
}

impl FlagField {
    pub const ALL: [FlagField; 2] = [FlagField::WithBalcony, FlagField::PetFriendly];

    pub fn column(self) -> Column {
        match self {
            FlagField::WithBalcony => Column::WithBalcony,
            FlagField::PetFriendly => Column::PetFriendly,
        }
    }
}

impl RangeField {
    pub const ALL: [RangeField; 3] = [RangeField::Area, RangeField::Lease, RangeField::Sale];

    pub fn column(self) -> Column {
        match self {
            RangeField::Area => Column::AreaSqm,
            RangeField::Lease => Column::LeasingPrice,
            RangeField::Sale => Column::SellingPrice,
        }
    }
}

/// Every filter criterion of the listings table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Global term, matched against `Column::SEARCHABLE`
    pub search: String,

    pub code: String,
    pub caption: String,
    pub property_name: String,
    pub floor_number: String,
    pub unit_number: String,
    pub parking: String,

    pub category: String,
    pub city: String,
    pub property_type: String,
    pub furnishing: String,
    pub bedrooms: String,
    pub availability: String,

    pub with_balcony: TriState,
    pub pet_friendly: TriState,

    pub area: RangeInput,
    pub lease: RangeInput,
    pub sale: RangeInput,
}

impl FilterState {
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Code => &self.code,
            TextField::Caption => &self.caption,
            TextField::PropertyName => &self.property_name,
            TextField::FloorNumber => &self.floor_number,
            TextField::UnitNumber => &self.unit_number,
            TextField::Parking => &self.parking,
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Code => &mut self.code,
            TextField::Caption => &mut self.caption,
            TextField::PropertyName => &mut self.property_name,
            TextField::FloorNumber => &mut self.floor_number,
            TextField::UnitNumber => &mut self.unit_number,
            TextField::Parking => &mut self.parking,
        }
    }

    pub fn selection(&self, field: SelectField) -> &str {
        match field {
            SelectField::Category => &self.category,
            SelectField::City => &self.city,
            SelectField::PropertyType => &self.property_type,
            SelectField::Furnishing => &self.furnishing,
            SelectField::Bedrooms => &self.bedrooms,
            SelectField::Availability => &self.availability,
        }
    }

    fn selection_mut(&mut self, field: SelectField) -> &mut String {
        match field {
            SelectField::Category => &mut self.category,
            SelectField::City => &mut self.city,
            SelectField::PropertyType => &mut self.property_type,
            SelectField::Furnishing => &mut self.furnishing,
            SelectField::Bedrooms => &mut self.bedrooms,
            SelectField::Availability => &mut self.availability,
        }
    }

    pub fn flag(&self, field: FlagField) -> TriState {
        match field {
            FlagField::WithBalcony => self.with_balcony,
            FlagField::PetFriendly => self.pet_friendly,
        }
    }

    fn flag_mut(&mut self, field: FlagField) -> &mut TriState {
        match field {
            FlagField::WithBalcony => &mut self.with_balcony,
            FlagField::PetFriendly => &mut self.pet_friendly,
        }
    }

    pub fn range(&self, field: RangeField) -> &RangeInput {
        match field {
            RangeField::Area => &self.area,
            RangeField::Lease => &self.lease,
            RangeField::Sale => &self.sale,
        }
    }

    fn range_mut(&mut self, field: RangeField) -> &mut RangeInput {
        match field {
            RangeField::Area => &mut self.area,
            RangeField::Lease => &mut self.lease,
            RangeField::Sale => &mut self.sale,
        }
    }
}

/// A single user interaction with the table controls
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAction {
    Search(String),
    Text(TextField, String),
    Select(SelectField, String),
    Flag(FlagField, TriState),
    RangeMin(RangeField, String),
    RangeMax(RangeField, String),
    /// Header click
    SortBy(Column),
    /// Clear every filter; the sort is kept
    Reset,
}

impl FilterAction {
    /// Keystroke-driven actions; a live query waits for typing to pause
    pub fn is_typing(&self) -> bool {
        matches!(
            self,
            FilterAction::Search(_)
                | FilterAction::Text(..)
                | FilterAction::RangeMin(..)
                | FilterAction::RangeMax(..)
        )
    }
}

/// Filter and sort state of one table, updated only through [`ViewState::apply`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub filters: FilterState,
    pub sort: SortState,
}

impl ViewState {
    pub fn apply(&mut self, action: FilterAction) {
        match action {
            FilterAction::Search(term) => self.filters.search = term,
            FilterAction::Text(field, value) => *self.filters.text_mut(field) = value,
            FilterAction::Select(field, value) => *self.filters.selection_mut(field) = value,
            FilterAction::Flag(field, value) => *self.filters.flag_mut(field) = value,
            FilterAction::RangeMin(field, value) => self.filters.range_mut(field).min = value,
            FilterAction::RangeMax(field, value) => self.filters.range_mut(field).max = value,
            FilterAction::SortBy(column) => self.sort.toggle(column),
            FilterAction::Reset => self.filters = FilterState::default(),
        }
    }
}
