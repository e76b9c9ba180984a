//! Submission card assembly
//!
//! Turns extracted product data plus a resolved category into the registry
//! payload. Five attributes are always present regardless of source-data
//! completeness: producing country, full name, trademark, tariff group and
//! the regulation clause. Everything else is conditional on the extracted
//! fields.

use crate::extractors::tariff::FULL_TARIFF_CATEGORIES;
use crate::models::card::{attr_ids, CardAttribute, SubmissionCard};
use crate::models::ExtractedProductData;
use crate::services::category_resolver::CategoryResolver;
use std::sync::Arc;

/// Trademark written when the source data has no brand
pub const DEFAULT_BRAND: &str = "БрендОдежды";
/// Fixed producing country
pub const PRODUCING_COUNTRY: &str = "RU";
/// Fixed technical-regulation citation for light-industry goods
pub const REGULATION_TEXT: &str =
    "ТР ТС 017/2011 \"О безопасности продукции легкой промышленности\"";

const SIZE_VALUE_TYPE: &str = "МЕЖДУНАРОДНЫЙ";
const ARTICLE_VALUE_TYPE: &str = "Артикул";

/// Canonical gender tokens accepted by the registry
pub const GENDER_MALE: &str = "МУЖСКОЙ";
pub const GENDER_FEMALE: &str = "ЖЕНСКИЙ";
pub const GENDER_UNSTATED: &str = "БЕЗ УКАЗАНИЯ ПОЛА";
pub const GENDER_UNISEX: &str = "УНИСЕКС";

/// Card assembly service
pub struct CardBuilder {
    resolver: Arc<CategoryResolver>,
}

impl CardBuilder {
    pub fn new(resolver: Arc<CategoryResolver>) -> Self {
        Self { resolver }
    }

    /// Build a card, resolving the category when the caller does not pin
    /// one: tariff+kind → tariff-only → kind-only → fixed default.
    pub async fn build(
        &self,
        data: &ExtractedProductData,
        category_id: Option<u32>,
    ) -> SubmissionCard {
        let category = match category_id {
            Some(id) => id,
            None => {
                self.resolver
                    .resolve_category(&data.tariff_code, &data.product_type)
                    .await
            }
        };
        build_card_for_category(data, category)
    }
}

/// Assemble the payload for an already-resolved category. Pure; no I/O.
pub fn build_card_for_category(data: &ExtractedProductData, category: u32) -> SubmissionCard {
    let tariff = data.tariff_code.trim();
    let group: String = tariff.chars().take(4).collect();

    // per-category format rule: a handful of categories demand the full
    // 10-digit code on the card, everything else gets the 4-digit group
    let requires_full = FULL_TARIFF_CATEGORIES.contains(&category);
    let has_full_code = tariff.chars().count() == 10;
    let card_tariff = if requires_full && has_full_code {
        tariff.to_string()
    } else {
        group.clone()
    };

    let brand = if data.brand.is_empty() {
        DEFAULT_BRAND.to_string()
    } else {
        data.brand.clone()
    };

    let mut attrs = vec![
        CardAttribute::new(attr_ids::COUNTRY, PRODUCING_COUNTRY),
        CardAttribute::new(attr_ids::FULL_NAME, data.name.clone()),
        CardAttribute::new(attr_ids::TRADEMARK, brand.clone()),
        CardAttribute::new(attr_ids::TARIFF_GROUP, group),
    ];

    if requires_full && has_full_code {
        attrs.push(CardAttribute::new(attr_ids::TARIFF_DETAILED, tariff));
    }
    if !data.product_type.is_empty() {
        attrs.push(CardAttribute::new(
            attr_ids::KIND,
            data.product_type.to_uppercase(),
        ));
    }
    if !data.color.is_empty() {
        attrs.push(CardAttribute::new(
            attr_ids::COLOR,
            data.color.to_uppercase(),
        ));
    }
    if !data.size.is_empty() {
        attrs.push(CardAttribute::with_value_type(
            attr_ids::SIZE,
            data.size.clone(),
            SIZE_VALUE_TYPE,
        ));
    }
    if !data.composition.is_empty() {
        attrs.push(CardAttribute::new(
            attr_ids::COMPOSITION,
            data.composition.clone(),
        ));
    }

    attrs.push(CardAttribute::new(attr_ids::REGULATION, REGULATION_TEXT));

    if !data.article.is_empty() {
        attrs.push(CardAttribute::with_value_type(
            attr_ids::ARTICLE,
            data.article.clone(),
            ARTICLE_VALUE_TYPE,
        ));
    }
    if let Some(gender) = determine_gender(data) {
        attrs.push(CardAttribute::new(attr_ids::GENDER, gender));
    }
    if !data.permit_docs.is_empty() {
        attrs.push(CardAttribute::new(
            attr_ids::PERMIT_DOCS,
            data.permit_docs.clone(),
        ));
    }

    SubmissionCard {
        is_tech_gtin: true,
        tnved: card_tariff,
        brand,
        good_name: data.name.clone(),
        moderation: 0,
        categories: vec![category],
        good_attrs: attrs,
    }
}

/// Derive the target gender: explicit field first, then keyword search in
/// the product name, then the unisex default for a non-empty name.
/// Returns `None` when nothing applies (the attribute is then omitted).
pub fn determine_gender(data: &ExtractedProductData) -> Option<String> {
    if !data.target_gender.is_empty() {
        if let Some(gender) = gender_from_keywords(&data.target_gender) {
            return Some(gender.to_string());
        }
    }
    if let Some(gender) = gender_from_keywords(&data.name) {
        return Some(gender.to_string());
    }
    if !data.name.is_empty() {
        return Some(GENDER_UNISEX.to_string());
    }
    None
}

/// Keyword containment in Russian and English. Female keywords are tested
/// first: "women" contains "men".
fn gender_from_keywords(text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();
    if ["женск", "women", "female"].iter().any(|k| text.contains(k)) {
        return Some(GENDER_FEMALE);
    }
    if ["мужск", "men", "male"].iter().any(|k| text.contains(k)) {
        return Some(GENDER_MALE);
    }
    if ["детск", "kid", "child"].iter().any(|k| text.contains(k)) {
        return Some(GENDER_UNSTATED);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(name: &str, tariff: &str) -> ExtractedProductData {
        ExtractedProductData {
            name: name.to_string(),
            tariff_code: tariff.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn full_tariff_category_embeds_ten_digits() {
        let card = build_card_for_category(&data("Платье женское", "6204631800"), 30933);

        assert_eq!(card.tnved, "6204631800");
        assert_eq!(card.attr(attr_ids::TARIFF_GROUP), Some("6204"));
        assert_eq!(card.attr(attr_ids::TARIFF_DETAILED), Some("6204631800"));
    }

    #[test]
    fn other_categories_truncate_to_group() {
        let card = build_card_for_category(&data("Платье женское", "6204631800"), 215061);

        assert_eq!(card.tnved, "6204");
        assert_eq!(card.attr(attr_ids::TARIFF_GROUP), Some("6204"));
        assert_eq!(card.attr(attr_ids::TARIFF_DETAILED), None);
    }

    #[test]
    fn full_tariff_category_without_full_code_stays_grouped() {
        let card = build_card_for_category(&data("Платье", "6204"), 30933);

        assert_eq!(card.tnved, "6204");
        assert_eq!(card.attr(attr_ids::TARIFF_DETAILED), None);
    }

    #[test]
    fn empty_data_yields_exactly_the_mandatory_attributes() {
        let card = build_card_for_category(&ExtractedProductData::default(), 215009);

        let ids: Vec<u32> = card.good_attrs.iter().map(|a| a.attr_id).collect();
        assert_eq!(
            ids,
            vec![
                attr_ids::COUNTRY,
                attr_ids::FULL_NAME,
                attr_ids::TRADEMARK,
                attr_ids::TARIFF_GROUP,
                attr_ids::REGULATION,
            ]
        );
        assert_eq!(card.brand, DEFAULT_BRAND);
        assert_eq!(card.categories, vec![215009]);
        assert_eq!(card.moderation, 0);
        assert!(card.is_tech_gtin);
    }

    #[test]
    fn conditional_attributes_follow_extracted_fields() {
        let mut extracted = data("Платье женское", "6204631800");
        extracted.product_type = "Платье".to_string();
        extracted.color = "красный".to_string();
        extracted.size = "44".to_string();
        extracted.composition = "Хлопок 100%".to_string();
        extracted.article = "ART-1".to_string();
        extracted.brand = "Ромашка".to_string();
        extracted.permit_docs = "Декларация ЕАЭС".to_string();

        let card = build_card_for_category(&extracted, 30933);

        assert_eq!(card.attr(attr_ids::KIND), Some("ПЛАТЬЕ"));
        assert_eq!(card.attr(attr_ids::COLOR), Some("КРАСНЫЙ"));
        assert_eq!(card.attr(attr_ids::TRADEMARK), Some("Ромашка"));
        assert_eq!(card.attr(attr_ids::PERMIT_DOCS), Some("Декларация ЕАЭС"));

        let size = card
            .good_attrs
            .iter()
            .find(|a| a.attr_id == attr_ids::SIZE)
            .unwrap();
        assert_eq!(size.attr_value_type.as_deref(), Some("МЕЖДУНАРОДНЫЙ"));

        let article = card
            .good_attrs
            .iter()
            .find(|a| a.attr_id == attr_ids::ARTICLE)
            .unwrap();
        assert_eq!(article.attr_value_type.as_deref(), Some("Артикул"));
    }

    #[test]
    fn gender_from_name_keywords() {
        assert_eq!(
            determine_gender(&data("Платье женское", "6204440000")),
            Some(GENDER_FEMALE.to_string())
        );
        assert_eq!(
            determine_gender(&data("Брюки мужские", "")),
            Some(GENDER_MALE.to_string())
        );
        assert_eq!(
            determine_gender(&data("Костюм детский", "")),
            Some(GENDER_UNSTATED.to_string())
        );
    }

    #[test]
    fn explicit_gender_field_wins_over_name() {
        let mut extracted = data("Платье женское", "");
        extracted.target_gender = "Мужской".to_string();
        assert_eq!(
            determine_gender(&extracted),
            Some(GENDER_MALE.to_string())
        );
    }

    #[test]
    fn english_women_is_not_misread_as_men() {
        assert_eq!(
            determine_gender(&data("Dress for women", "")),
            Some(GENDER_FEMALE.to_string())
        );
    }

    #[test]
    fn unisex_default_needs_a_name() {
        assert_eq!(
            determine_gender(&data("Шарф", "")),
            Some(GENDER_UNISEX.to_string())
        );
        assert_eq!(determine_gender(&ExtractedProductData::default()), None);
    }
}
