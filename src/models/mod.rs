use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::filter::parse::parse_amount;

#[cfg(test)]
pub(crate) mod fixtures;

/// One property entry from the inventory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub code: Option<String>,
    pub caption: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub furnishing: Option<String>,
    /// Stored as text upstream ("Studio", "2", "3+")
    pub bedrooms: Option<String>,
    pub with_balcony: Option<bool>,
    pub pet_friendly: Option<bool>,
    pub property_name: Option<String>,
    pub floor_number: Option<String>,
    pub unit_number: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub area_sqm: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub leasing_price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub selling_price: Option<f64>,
    pub parking: Option<String>,
    pub availability: Option<String>,
    pub updated_at: DateTime<Utc>,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("unsupported listing id: {other}"))),
    }
}

// numeric/decimal columns sometimes arrive as strings
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => Ok(parse_amount(&s)),
        other => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}

/// How a column's values compare and filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Bool,
    Timestamp,
}

/// Borrowed view of one field of a listing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Number(Option<f64>),
    Bool(Option<bool>),
    Timestamp(DateTime<Utc>),
}

/// Every column the engine reads from the `properties` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Code,
    Caption,
    Category,
    City,
    PropertyType,
    Furnishing,
    Bedrooms,
    WithBalcony,
    PetFriendly,
    PropertyName,
    FloorNumber,
    UnitNumber,
    AreaSqm,
    LeasingPrice,
    SellingPrice,
    Parking,
    Availability,
    UpdatedAt,
}

impl Column {
    pub const ALL: [Column; 19] = [
        Column::Id,
        Column::Code,
        Column::Caption,
        Column::Category,
        Column::City,
        Column::PropertyType,
        Column::Furnishing,
        Column::Bedrooms,
        Column::WithBalcony,
        Column::PetFriendly,
        Column::PropertyName,
        Column::FloorNumber,
        Column::UnitNumber,
        Column::AreaSqm,
        Column::LeasingPrice,
        Column::SellingPrice,
        Column::Parking,
        Column::Availability,
        Column::UpdatedAt,
    ];

    /// Columns the global search term is matched against
    pub const SEARCHABLE: [Column; 8] = [
        Column::Code,
        Column::Caption,
        Column::Category,
        Column::City,
        Column::PropertyType,
        Column::Bedrooms,
        Column::PropertyName,
        Column::UnitNumber,
    ];

    /// Wire name of the column in the backing table
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Code => "code",
            Column::Caption => "caption",
            Column::Category => "category",
            Column::City => "city",
            Column::PropertyType => "property_type",
            Column::Furnishing => "furnishing",
            Column::Bedrooms => "bedrooms",
            Column::WithBalcony => "with_balcony",
            Column::PetFriendly => "pet_friendly",
            Column::PropertyName => "property_name",
            Column::FloorNumber => "floor_number",
            Column::UnitNumber => "unit_number",
            Column::AreaSqm => "area_sqm",
            Column::LeasingPrice => "leasing_price",
            Column::SellingPrice => "selling_price",
            Column::Parking => "parking",
            Column::Availability => "availability",
            Column::UpdatedAt => "updated_at",
        }
    }

    /// Short header used by the table view
    pub fn label(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Code => "Code",
            Column::Caption => "Caption",
            Column::Category => "Category",
            Column::City => "City",
            Column::PropertyType => "Type",
            Column::Furnishing => "Furnishing",
            Column::Bedrooms => "BR",
            Column::WithBalcony => "Balcony",
            Column::PetFriendly => "Pet",
            Column::PropertyName => "Property",
            Column::FloorNumber => "Floor",
            Column::UnitNumber => "Unit",
            Column::AreaSqm => "sqm",
            Column::LeasingPrice => "Lease",
            Column::SellingPrice => "Sale",
            Column::Parking => "Parking",
            Column::Availability => "Availability",
            Column::UpdatedAt => "Updated",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::WithBalcony | Column::PetFriendly => ColumnKind::Bool,
            Column::AreaSqm | Column::LeasingPrice | Column::SellingPrice => ColumnKind::Number,
            Column::UpdatedAt => ColumnKind::Timestamp,
            _ => ColumnKind::Text,
        }
    }

    /// Read this column out of a listing
    pub fn value(self, listing: &Listing) -> FieldValue<'_> {
        match self {
            Column::Id => FieldValue::Text(Some(listing.id.as_str())),
            Column::Code => FieldValue::Text(listing.code.as_deref()),
            Column::Caption => FieldValue::Text(listing.caption.as_deref()),
            Column::Category => FieldValue::Text(listing.category.as_deref()),
            Column::City => FieldValue::Text(listing.city.as_deref()),
            Column::PropertyType => FieldValue::Text(listing.property_type.as_deref()),
            Column::Furnishing => FieldValue::Text(listing.furnishing.as_deref()),
            Column::Bedrooms => FieldValue::Text(listing.bedrooms.as_deref()),
            Column::WithBalcony => FieldValue::Bool(listing.with_balcony),
            Column::PetFriendly => FieldValue::Bool(listing.pet_friendly),
            Column::PropertyName => FieldValue::Text(listing.property_name.as_deref()),
            Column::FloorNumber => FieldValue::Text(listing.floor_number.as_deref()),
            Column::UnitNumber => FieldValue::Text(listing.unit_number.as_deref()),
            Column::AreaSqm => FieldValue::Number(listing.area_sqm),
            Column::LeasingPrice => FieldValue::Number(listing.leasing_price),
            Column::SellingPrice => FieldValue::Number(listing.selling_price),
            Column::Parking => FieldValue::Text(listing.parking.as_deref()),
            Column::Availability => FieldValue::Text(listing.availability.as_deref()),
            Column::UpdatedAt => FieldValue::Timestamp(listing.updated_at),
        }
    }

    /// Comma-separated projection for a select clause
    pub fn projection() -> String {
        Column::ALL
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Column::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| format!("unknown column: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_backend_row() {
        let row = serde_json::json!({
            "id": 42,
            "code": "MKT-001",
            "leasing_price": "25,000",
            "selling_price": null,
            "pet_friendly": false,
            "updated_at": "2025-01-05T08:30:00+00:00"
        });

        let listing: Listing = serde_json::from_value(row).unwrap();
        assert_eq!(listing.id, "42");
        assert_eq!(listing.code.as_deref(), Some("MKT-001"));
        assert_eq!(listing.leasing_price, Some(25_000.0));
        assert_eq!(listing.selling_price, None);
        assert_eq!(listing.area_sqm, None);
        assert_eq!(listing.pet_friendly, Some(false));
        assert_eq!(listing.with_balcony, None);
        assert_eq!(listing.caption, None);
    }

    #[test]
    fn rejects_object_id() {
        let row = serde_json::json!({
            "id": {"nested": true},
            "updated_at": "2025-01-05T08:30:00Z"
        });
        assert!(serde_json::from_value::<Listing>(row).is_err());
    }

    #[test]
    fn column_names_round_trip_through_from_str() {
        for column in Column::ALL {
            assert_eq!(column.name().parse::<Column>().unwrap(), column);
        }
        assert_eq!("leasing-price".parse::<Column>().unwrap(), Column::LeasingPrice);
        assert!("price".parse::<Column>().is_err());
    }

    #[test]
    fn lease_and_sale_read_their_own_fields() {
        let mut listing = fixtures::listing("1");
        listing.leasing_price = Some(30_000.0);
        listing.selling_price = Some(9_500_000.0);

        assert_eq!(Column::LeasingPrice.value(&listing), FieldValue::Number(Some(30_000.0)));
        assert_eq!(Column::SellingPrice.value(&listing), FieldValue::Number(Some(9_500_000.0)));
    }
}
