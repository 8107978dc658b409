//! Cell formatting for printed tables. Absent values render as an empty cell.

use chrono::{DateTime, Utc};

use crate::models::{Column, FieldValue, Listing};

/// `1234567.5` → `1,234,567.5`; at most three decimals
pub fn format_number(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return String::new();
    };

    let rendered = format!("{:.3}", value.abs());
    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && (whole != "0" || !fraction.is_empty()) {
        "-"
    } else {
        ""
    };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

pub fn format_bool(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "",
    }
}

/// `January 5, 2025`
pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%B %-d, %Y").to_string()
}

pub fn cell(listing: &Listing, column: Column) -> String {
    match column.value(listing) {
        FieldValue::Text(text) => text.unwrap_or_default().to_string(),
        FieldValue::Number(number) => format_number(number),
        FieldValue::Bool(flag) => format_bool(flag).to_string(),
        FieldValue::Timestamp(at) => format_date(at),
    }
}
