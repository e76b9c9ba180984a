//! Category-driven tariff code extraction
//!
//! The registry runs two mutually exclusive tariff regimes. Categories in
//! [`FULL_TARIFF_CATEGORIES`] require the detailed 10-digit code, carried in
//! a dedicated custom attribute; every other category uses the 4-digit group
//! form, carried in the record's direct tariff field or a group attribute.
//! Which attribute is authoritative follows from the referenced categories,
//! never from which values happen to be filled in.

use crate::extractors::is_empty_sentinel;
use crate::models::CatalogItem;

/// Custom attribute id holding the 4-digit tariff group
pub const TARIFF_GROUP_ATTR_ID: u64 = 3959;
/// Custom attribute id holding the detailed 10-digit tariff code
pub const TARIFF_DETAILED_ATTR_ID: u64 = 13933;

/// Categories that require the detailed 10-digit code on their cards
/// (apparel, footwear)
pub const FULL_TARIFF_CATEGORIES: &[u32] = &[30933, 30717];

/// Extract the authoritative tariff code for a record, consulting the
/// owning product for variants. Returns the empty string when the
/// applicable regime has no usable value.
pub fn extract_tariff(item: &CatalogItem, parent: Option<&CatalogItem>) -> String {
    let requires_full = referenced_categories(item, parent)
        .iter()
        .any(|c| FULL_TARIFF_CATEGORIES.contains(c));

    if requires_full {
        // 10-digit regime: only the detailed attribute counts
        return attr_by_id(item, parent, TARIFF_DETAILED_ATTR_ID).unwrap_or_default();
    }

    // 4-digit regime: direct field first, then the group attribute
    if let Some(code) = direct_tariff(item).or_else(|| parent.and_then(direct_tariff)) {
        return code;
    }
    attr_by_id(item, parent, TARIFF_GROUP_ATTR_ID).unwrap_or_default()
}

/// Registry categories referenced by the record pair: explicit category
/// references plus any attribute value carrying a category reference.
fn referenced_categories(item: &CatalogItem, parent: Option<&CatalogItem>) -> Vec<u32> {
    let mut categories = Vec::new();

    for record in std::iter::once(item).chain(parent) {
        categories.extend(record.categories.iter().filter_map(|c| c.cat_id));
        categories.extend(
            record
                .attributes
                .iter()
                .filter_map(|a| a.value.as_ref())
                .filter_map(|v| v.category_id()),
        );
    }

    categories
}

fn direct_tariff(item: &CatalogItem) -> Option<String> {
    item.tnved
        .as_deref()
        .map(str::trim)
        .filter(|t| !is_empty_sentinel(t))
        .map(str::to_string)
}

fn attr_by_id(item: &CatalogItem, parent: Option<&CatalogItem>, attr_id: u64) -> Option<String> {
    item.attr_text_by_id(attr_id)
        .or_else(|| parent.and_then(|p| p.attr_text_by_id(attr_id)))
        .filter(|v| !is_empty_sentinel(v))
}
