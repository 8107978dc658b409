//! Listing builders shared by unit tests.

use chrono::{TimeZone, Utc};

use super::Listing;

/// Bare listing with every optional field absent
pub fn listing(id: &str) -> Listing {
    Listing {
        id: id.to_string(),
        code: None,
        caption: None,
        category: None,
        city: None,
        property_type: None,
        furnishing: None,
        bedrooms: None,
        with_balcony: None,
        pet_friendly: None,
        property_name: None,
        floor_number: None,
        unit_number: None,
        area_sqm: None,
        leasing_price: None,
        selling_price: None,
        parking: None,
        availability: None,
        updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// Small inventory covering Makati, BGC and Cebu
pub fn inventory() -> Vec<Listing> {
    let mut studio = listing("a1");
    studio.code = Some("MKT-001".to_string());
    studio.caption = Some("Studio Unit for Lease near Ayala".to_string());
    studio.category = Some("Condominium".to_string());
    studio.city = Some("Makati".to_string());
    studio.property_type = Some("Residential".to_string());
    studio.furnishing = Some("Fully Furnished".to_string());
    studio.bedrooms = Some("Studio".to_string());
    studio.with_balcony = Some(false);
    studio.pet_friendly = Some(true);
    studio.property_name = Some("Salcedo Towers".to_string());
    studio.area_sqm = Some(28.0);
    studio.leasing_price = Some(25_000.0);
    studio.availability = Some("Available".to_string());
    studio.updated_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();

    let mut unpriced = listing("a2");
    unpriced.code = Some("MKT-002".to_string());
    unpriced.caption = Some("2BR corner unit, price on request".to_string());
    unpriced.category = Some("Condominium".to_string());
    unpriced.city = Some("Makati".to_string());
    unpriced.bedrooms = Some("2".to_string());
    unpriced.with_balcony = Some(true);
    unpriced.area_sqm = Some(64.5);
    unpriced.updated_at = Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap();

    let mut office = listing("b1");
    office.code = Some("BGC-101".to_string());
    office.caption = Some("Office space in BGC".to_string());
    office.category = Some("Office".to_string());
    office.city = Some("Taguig".to_string());
    office.property_type = Some("Commercial".to_string());
    office.furnishing = Some("Bare".to_string());
    office.pet_friendly = Some(false);
    office.area_sqm = Some(120.0);
    office.leasing_price = Some(180_000.0);
    office.selling_price = Some(42_000_000.0);
    office.availability = Some("Leased".to_string());
    office.updated_at = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();

    let mut house = listing("c1");
    house.code = Some("CEB-300".to_string());
    house.caption = Some("House and lot, Lahug".to_string());
    house.category = Some("House and Lot".to_string());
    house.city = Some("Cebu City".to_string());
    house.property_type = Some("Residential".to_string());
    house.bedrooms = Some("4".to_string());
    house.with_balcony = Some(true);
    house.pet_friendly = Some(true);
    house.selling_price = Some(18_500_000.0);
    house.availability = Some("Available".to_string());
    house.updated_at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();

    vec![studio, unpriced, office, house]
}

pub fn ids(rows: &[Listing]) -> Vec<&str> {
    rows.iter().map(|l| l.id.as_str()).collect()
}
