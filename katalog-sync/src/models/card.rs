//! Registry submission card payload

use serde::Serialize;

/// Registry attribute ids used in submission cards
pub mod attr_ids {
    /// Producing country
    pub const COUNTRY: u32 = 2630;
    /// Full product name
    pub const FULL_NAME: u32 = 2478;
    /// Trademark
    pub const TRADEMARK: u32 = 2504;
    /// Tariff group (4-digit)
    pub const TARIFF_GROUP: u32 = 3959;
    /// Detailed tariff code (10-digit)
    pub const TARIFF_DETAILED: u32 = 13933;
    /// Product kind
    pub const KIND: u32 = 12;
    /// Color
    pub const COLOR: u32 = 36;
    /// Size
    pub const SIZE: u32 = 35;
    /// Material composition
    pub const COMPOSITION: u32 = 2483;
    /// Technical-regulation clause
    pub const REGULATION: u32 = 13836;
    /// Article code
    pub const ARTICLE: u32 = 13914;
    /// Target gender
    pub const GENDER: u32 = 14013;
    /// Permit documents
    pub const PERMIT_DOCS: u32 = 23557;
}

/// One attribute entry of a submission card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardAttribute {
    pub attr_id: u32,
    pub attr_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr_value_type: Option<String>,
}

impl CardAttribute {
    pub fn new(attr_id: u32, attr_value: impl Into<String>) -> Self {
        Self {
            attr_id,
            attr_value: attr_value.into(),
            attr_value_type: None,
        }
    }

    pub fn with_value_type(
        attr_id: u32,
        attr_value: impl Into<String>,
        value_type: impl Into<String>,
    ) -> Self {
        Self {
            attr_id,
            attr_value: attr_value.into(),
            attr_value_type: Some(value_type.into()),
        }
    }
}

/// Submission card payload.
///
/// Exactly one category id per card; `moderation` is always 0 (draft).
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionCard {
    /// Request a technical (registry-assigned) GTIN
    pub is_tech_gtin: bool,
    /// Tariff code: 4-digit group, or full 10-digit form for categories
    /// requiring the detailed code
    pub tnved: String,
    pub brand: String,
    pub good_name: String,
    /// 0 = draft
    pub moderation: u8,
    pub categories: Vec<u32>,
    pub good_attrs: Vec<CardAttribute>,
}

impl SubmissionCard {
    /// Look up an attribute value by id
    pub fn attr(&self, attr_id: u32) -> Option<&str> {
        self.good_attrs
            .iter()
            .find(|a| a.attr_id == attr_id)
            .map(|a| a.attr_value.as_str())
    }
}
