//! Extraction layer: raw inventory records → canonical product data

pub mod attribute_extractor;
pub mod tariff;

pub use attribute_extractor::{extract_fields, Extractor};
pub use tariff::extract_tariff;

/// Placeholder tokens the inventory platform emits for absent values.
/// Anything matching is cleared to the canonical empty string during
/// extraction; nothing downstream ever sees a sentinel.
const EMPTY_SENTINELS: &[&str] = &["", "None", "nan", "Нет"];

/// Whether a raw value is a recognized empty placeholder
pub(crate) fn is_empty_sentinel(value: &str) -> bool {
    EMPTY_SENTINELS.contains(&value.trim())
}

/// Trim a raw value and collapse sentinels to the empty string
pub(crate) fn scrub(value: &str) -> String {
    let trimmed = value.trim();
    if is_empty_sentinel(trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}
