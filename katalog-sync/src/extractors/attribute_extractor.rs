//! Attribute extraction with parent inheritance
//!
//! Turns one inventory record (plus, for variants, its owning product) into
//! the canonical [`ExtractedProductData`]. A variant's own values always win;
//! emptiness is tested before falling back to the parent. Color and size
//! check the variant's characteristics first, since that is where the
//! inventory platform keeps per-variant dimension values.

use crate::config::FieldNames;
use crate::extractors::{extract_tariff, scrub};
use crate::models::{CatalogItem, ExtractedProductData, SyncCandidate};
use crate::services::category_resolver::CategoryResolver;
use crate::services::suggestions::find_similar;
use crate::services::vocabulary_cache::VocabularyCache;
use std::sync::Arc;

/// Fixed threshold handed to the suggestion finder
const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Extraction service: pure field resolution plus vocabulary validation
pub struct Extractor {
    resolver: Arc<CategoryResolver>,
    vocab: Arc<VocabularyCache>,
    fields: FieldNames,
}

impl Extractor {
    pub fn new(
        resolver: Arc<CategoryResolver>,
        vocab: Arc<VocabularyCache>,
        fields: FieldNames,
    ) -> Self {
        Self {
            resolver,
            vocab,
            fields,
        }
    }

    /// Extract and validate one sync candidate
    pub async fn extract(&self, candidate: &SyncCandidate) -> ExtractedProductData {
        let item = &candidate.item;
        let parent = candidate.parent.as_deref();

        let mut data = extract_fields(item, parent, &self.fields);

        if !data.color.is_empty() {
            let (valid, preset) = self.vocab.validate_color(&data.color).await;
            data.color_valid = valid;
            if !valid {
                data.color_suggestions = find_similar(&data.color, &preset, SUGGESTION_THRESHOLD);
            }
        }

        if !data.product_type.is_empty() {
            // kind vocabularies are per-category: resolve from the tariff
            // code when present, else validate against the default category
            let category = if data.tariff_code.is_empty() {
                self.resolver.default_category()
            } else {
                self.resolver.resolve_category(&data.tariff_code, "").await
            };
            tracing::debug!(
                tariff_code = %data.tariff_code,
                category,
                "validating product kind"
            );

            let (valid, preset) = self
                .vocab
                .validate_kind(&data.product_type, Some(category))
                .await;
            data.product_type_valid = valid;
            if !valid {
                data.product_type_suggestions =
                    find_similar(&data.product_type, &preset, SUGGESTION_THRESHOLD);
            }
        }

        data
    }
}

/// Pure field resolution: no I/O, idempotent on identical input.
pub fn extract_fields(
    item: &CatalogItem,
    parent: Option<&CatalogItem>,
    fields: &FieldNames,
) -> ExtractedProductData {
    let mut data = ExtractedProductData {
        name: item.name.trim().to_string(),
        item_kind: item.meta.kind.clone(),
        ..Default::default()
    };

    data.article = item.article.trim().to_string();
    if data.article.is_empty() {
        if let Some(parent) = parent {
            data.article = parent.article.trim().to_string();
        }
    }

    data.composition = inherited_attr(item, parent, &fields.composition);
    data.permit_docs = inherited_attr(item, parent, &fields.permit_docs);
    data.brand = inherited_attr(item, parent, &fields.brand);
    data.product_type = inherited_attr(item, parent, &fields.product_type);
    data.target_gender = inherited_attr(item, parent, &fields.target_gender);
    data.size_type = inherited_attr(item, parent, &fields.size_type);

    data.color = characteristic_value(item, &fields.color_keywords)
        .unwrap_or_else(|| inherited_attr(item, parent, &fields.color));
    data.size = characteristic_value(item, &fields.size_keywords)
        .unwrap_or_else(|| inherited_attr(item, parent, &fields.size));

    data.tariff_code = extract_tariff(item, parent);

    // sentinel scrub: canonical empty from here on
    data.name = scrub(&data.name);
    data.article = scrub(&data.article);
    data.composition = scrub(&data.composition);
    data.permit_docs = scrub(&data.permit_docs);
    data.brand = scrub(&data.brand);
    data.color = scrub(&data.color);
    data.size = scrub(&data.size);
    data.product_type = scrub(&data.product_type);
    data.tariff_code = scrub(&data.tariff_code);
    data.target_gender = scrub(&data.target_gender);
    data.size_type = scrub(&data.size_type);

    data
}

/// Item's attribute if non-empty, else the parent's, else empty
fn inherited_attr(item: &CatalogItem, parent: Option<&CatalogItem>, name: &str) -> String {
    item.attr_text(name)
        .or_else(|| parent.and_then(|p| p.attr_text(name)))
        .unwrap_or_default()
}

/// First characteristic whose name contains one of the keyword synonyms
/// (case-insensitive substring; characteristic list order wins)
fn characteristic_value(item: &CatalogItem, keywords: &[String]) -> Option<String> {
    for characteristic in &item.characteristics {
        let name = characteristic.name.to_lowercase();
        let Some(value) = characteristic.value.as_ref() else {
            continue;
        };
        let text = value.as_text();
        if text.is_empty() {
            continue;
        }
        if keywords.iter().any(|k| name.contains(k.as_str())) {
            return Some(text);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FieldNames {
        FieldNames::default()
    }

    fn item(json: serde_json::Value) -> CatalogItem {
        serde_json::from_value(json).unwrap()
    }

    fn parent_with_attrs() -> CatalogItem {
        item(serde_json::json!({
            "meta": {"type": "product"},
            "id": "b7a9de30-0000-4a67-9f5e-000000000001",
            "name": "Платье летнее",
            "article": "ART-100",
            "tnved": "6204",
            "attributes": [
                {"name": "Состав", "value": "Хлопок 100%"},
                {"name": "Бренд НК", "value": "Ромашка"},
                {"name": "Вид товара", "value": "Платье"},
                {"name": "Цвет", "value": "Белый"},
            ],
        }))
    }

    #[test]
    fn variant_value_wins_over_parent() {
        let parent = parent_with_attrs();
        let variant = item(serde_json::json!({
            "meta": {"type": "variant"},
            "id": "b7a9de30-0000-4a67-9f5e-000000000002",
            "name": "Платье летнее (44)",
            "attributes": [{"name": "Состав", "value": "Лён 100%"}],
        }));

        let data = extract_fields(&variant, Some(&parent), &fields());
        assert_eq!(data.composition, "Лён 100%");
        // untouched fields inherit
        assert_eq!(data.brand, "Ромашка");
        assert_eq!(data.product_type, "Платье");
        assert_eq!(data.article, "ART-100");
    }

    #[test]
    fn empty_variant_value_falls_back_to_parent() {
        let parent = parent_with_attrs();
        let variant = item(serde_json::json!({
            "meta": {"type": "variant"},
            "id": "b7a9de30-0000-4a67-9f5e-000000000002",
            "name": "Платье летнее (44)",
            "attributes": [{"name": "Состав", "value": ""}],
        }));

        let data = extract_fields(&variant, Some(&parent), &fields());
        assert_eq!(data.composition, "Хлопок 100%");
    }

    #[test]
    fn characteristics_beat_attributes_for_color_and_size() {
        let parent = parent_with_attrs();
        let variant = item(serde_json::json!({
            "meta": {"type": "variant"},
            "id": "b7a9de30-0000-4a67-9f5e-000000000002",
            "name": "Платье летнее (44)",
            "characteristics": [
                {"name": "Размер одежды", "value": "44"},
                {"name": "Цвет ткани", "value": {"name": "Синий"}},
            ],
        }));

        let data = extract_fields(&variant, Some(&parent), &fields());
        assert_eq!(data.color, "Синий");
        assert_eq!(data.size, "44");
    }

    #[test]
    fn characteristic_scan_respects_list_order() {
        let variant = item(serde_json::json!({
            "meta": {"type": "variant"},
            "id": "b7a9de30-0000-4a67-9f5e-000000000002",
            "name": "Платье (44)",
            "characteristics": [
                {"name": "Основной цвет", "value": "Красный"},
                {"name": "Цвет отделки", "value": "Чёрный"},
            ],
        }));

        let data = extract_fields(&variant, None, &fields());
        assert_eq!(data.color, "Красный");
    }

    #[test]
    fn sentinels_never_survive_extraction() {
        let record = item(serde_json::json!({
            "meta": {"type": "product"},
            "id": "b7a9de30-0000-4a67-9f5e-000000000001",
            "name": "Платье",
            "attributes": [
                {"name": "Состав", "value": "None"},
                {"name": "Разрешительные документы", "value": "nan"},
            ],
        }));

        let data = extract_fields(&record, None, &fields());
        assert_eq!(data.composition, "");
        assert_eq!(data.permit_docs, "");
    }

    #[test]
    fn negative_boolean_attribute_reads_as_empty() {
        // boolean false coerces to the localized "no" token, which the
        // sentinel pass clears
        let record = item(serde_json::json!({
            "meta": {"type": "product"},
            "id": "b7a9de30-0000-4a67-9f5e-000000000001",
            "name": "Платье",
            "attributes": [{"name": "Разрешительные документы", "value": false}],
        }));

        let data = extract_fields(&record, None, &fields());
        assert_eq!(data.permit_docs, "");
    }

    #[test]
    fn extraction_is_idempotent() {
        let parent = parent_with_attrs();
        let variant = item(serde_json::json!({
            "meta": {"type": "variant"},
            "id": "b7a9de30-0000-4a67-9f5e-000000000002",
            "name": "Платье летнее (44)",
            "characteristics": [{"name": "Размер", "value": "44"}],
        }));

        let first = extract_fields(&variant, Some(&parent), &fields());
        let second = extract_fields(&variant, Some(&parent), &fields());
        assert_eq!(first, second);
    }

    #[test]
    fn product_without_parent_uses_own_fields() {
        let data = extract_fields(&parent_with_attrs(), None, &fields());
        assert_eq!(data.name, "Платье летнее");
        assert_eq!(data.color, "Белый");
        assert_eq!(data.tariff_code, "6204");
        assert_eq!(data.item_kind, "product");
    }
}
