//! Canonical intermediate record produced by extraction

use serde::{Deserialize, Serialize};

/// Extracted, inheritance-resolved product data.
///
/// Every field is either a non-empty trimmed string or the empty string; no
/// sentinel placeholder tokens survive extraction. Created once per record
/// and immutable afterwards except for explicit user-supplied overrides
/// merged in before card assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedProductData {
    pub name: String,
    pub article: String,
    pub composition: String,
    pub permit_docs: String,
    pub brand: String,
    pub color: String,
    pub size: String,
    pub product_type: String,
    pub tariff_code: String,
    pub target_gender: String,
    pub size_type: String,

    /// Record kind the data was extracted from ("product", "variant", ...)
    pub item_kind: String,

    pub color_valid: bool,
    pub color_suggestions: Vec<String>,
    pub product_type_valid: bool,
    pub product_type_suggestions: Vec<String>,
}

/// User-supplied field overrides merged in before card assembly.
///
/// Only color, product kind and size may be overridden, and only with
/// non-empty values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldOverrides {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl FieldOverrides {
    /// Apply non-empty overrides to the extracted data
    pub fn apply(&self, data: &mut ExtractedProductData) {
        if let Some(color) = non_empty(&self.color) {
            data.color = color;
        }
        if let Some(kind) = non_empty(&self.product_type) {
            data.product_type = kind;
        }
        if let Some(size) = non_empty(&self.size) {
            data.size = size;
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
