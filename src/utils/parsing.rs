use crate::utils::constants::NULL_MARKERS;

/// Normalise a raw CSV field, mapping blanks and null markers to `None`
pub fn null_if_missing(field: Option<&str>) -> Option<&str> {
    let trimmed = field?.trim();
    if trimmed.is_empty() || NULL_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

/// Parse a nullable float field.
///
/// `Ok(None)` means the field was missing; `Err` carries the offending text.
pub fn parse_f64_field(field: Option<&str>) -> std::result::Result<Option<f64>, String> {
    match null_if_missing(field) {
        None => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(Some)
            .map_err(|_| text.to_string()),
    }
}

/// Parse an integer field, accepting integral floats such as `2023.0`
pub fn parse_integral(text: &str) -> Option<i64> {
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let value = text.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
