//! Permissive parsing of amounts typed into min/max boxes.

/// Parse a user-typed amount such as `"25,000"`, `"₱ 1 200 000"` or `"64.5"`.
///
/// Thousands separators, underscores, whitespace and a leading peso marker are
/// ignored. Anything else that does not parse yields `None`, which callers treat
/// as "no bound".
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix('₱')
        .or_else(|| trimmed.strip_prefix("PHP"))
        .or_else(|| trimmed.strip_prefix("Php"))
        .unwrap_or(trimmed);

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
