//! Inventory record model
//!
//! Records arrive from the inventory platform as free-form JSON. Attribute
//! and characteristic values vary in shape (string, boolean, number, or a
//! nested reference object); they are modeled as a tagged union and resolved
//! to plain display strings at this boundary so the extractor never sees an
//! ambiguous shape.

use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Localized boolean display tokens used by the inventory platform
pub const YES_TOKEN: &str = "Да";
pub const NO_TOKEN: &str = "Нет";

/// Record kind as reported by the platform's `meta.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Product,
    Variant,
    Bundle,
    Service,
    Unknown,
}

/// Record metadata envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    /// Record kind ("product", "variant", "bundle", "service")
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Canonical record URL; the trailing path segment is the record id
    #[serde(default)]
    pub href: String,
}

/// One inventory record (product, variant, bundle or service)
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogItem {
    #[serde(default)]
    pub meta: Meta,

    /// Record identifier
    pub id: Uuid,

    #[serde(default)]
    pub name: String,

    /// Article code; variants frequently leave this empty
    #[serde(default)]
    pub article: String,

    /// Direct customs tariff code field (4-digit group form)
    #[serde(default)]
    pub tnved: Option<String>,

    /// Custom attributes (name → value)
    #[serde(default)]
    pub attributes: Vec<ItemAttribute>,

    /// Variant-specific dimension values (color, size, ...)
    #[serde(default)]
    pub characteristics: Vec<Characteristic>,

    /// Registry category references attached to the record
    #[serde(default)]
    pub categories: Vec<CategoryRef>,

    /// Owning product reference (variants only)
    #[serde(default)]
    pub product: Option<ProductRef>,
}

/// One custom attribute
#[derive(Debug, Clone, Deserialize)]
pub struct ItemAttribute {
    /// Numeric attribute id where the platform assigns one
    #[serde(default)]
    pub attr_id: Option<u64>,

    #[serde(default, alias = "attr_name")]
    pub name: String,

    #[serde(default, alias = "attr_value")]
    pub value: Option<AttrValue>,
}

/// One variant characteristic
#[derive(Debug, Clone, Deserialize)]
pub struct Characteristic {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: Option<AttrValue>,
}

/// Registry category reference
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub cat_id: Option<u32>,
}

/// Owning product reference carried by variants
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRef {
    #[serde(default)]
    pub meta: Meta,
}

/// Attribute/characteristic value as it arrives on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Reference(ReferenceValue),
}

/// Nested reference object value
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceValue {
    #[serde(default)]
    pub name: String,

    /// Some reference values carry a registry category id
    #[serde(default)]
    pub cat_id: Option<u32>,
}

impl AttrValue {
    /// Resolve the wire value to a plain display string.
    ///
    /// Booleans map to the platform's localized yes/no tokens; integral
    /// numbers render without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            AttrValue::Bool(true) => YES_TOKEN.to_string(),
            AttrValue::Bool(false) => NO_TOKEN.to_string(),
            AttrValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            AttrValue::Text(s) => s.trim().to_string(),
            AttrValue::Reference(r) => r.name.trim().to_string(),
        }
    }

    /// Interpret the value as a boolean flag (sync selection checkbox)
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Bool(b) => *b,
            AttrValue::Number(n) => *n == 1.0,
            AttrValue::Text(s) => {
                matches!(s.trim().to_lowercase().as_str(), "да" | "true" | "1" | "yes")
            }
            AttrValue::Reference(r) => {
                matches!(r.name.trim().to_lowercase().as_str(), "да" | "true" | "yes")
            }
        }
    }

    /// Registry category id carried by a reference value, if any
    pub fn category_id(&self) -> Option<u32> {
        match self {
            AttrValue::Reference(r) => r.cat_id,
            _ => None,
        }
    }
}

impl CatalogItem {
    /// Record kind from the metadata envelope
    pub fn kind(&self) -> ItemKind {
        match self.meta.kind.as_str() {
            "product" => ItemKind::Product,
            "variant" => ItemKind::Variant,
            "bundle" => ItemKind::Bundle,
            "service" => ItemKind::Service,
            _ => ItemKind::Unknown,
        }
    }

    /// Display-string value of a custom attribute by name, if non-empty
    pub fn attr_text(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .filter(|a| a.name == name)
            .filter_map(|a| a.value.as_ref())
            .map(AttrValue::as_text)
            .find(|v| !v.is_empty())
    }

    /// Display-string value of a custom attribute by numeric id, if non-empty
    pub fn attr_text_by_id(&self, attr_id: u64) -> Option<String> {
        self.attributes
            .iter()
            .filter(|a| a.attr_id == Some(attr_id))
            .filter_map(|a| a.value.as_ref())
            .map(AttrValue::as_text)
            .find(|v| !v.is_empty())
    }

    /// Whether the named boolean-ish attribute is set
    pub fn attr_flag(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_ref())
            .map(AttrValue::is_truthy)
            .unwrap_or(false)
    }

    /// Owning product id for a variant, parsed from the reference URL tail
    pub fn parent_product_id(&self) -> Option<Uuid> {
        let href = &self.product.as_ref()?.meta.href;
        let tail = href.rsplit('/').next()?;
        Uuid::parse_str(tail).ok()
    }
}

/// A record selected for synchronization, paired with its owning product
/// when the record is a variant.
///
/// The parent link exists only for the duration of one processing pass; it
/// lets attribute inheritance resolve without re-fetching the product.
#[derive(Debug, Clone)]
pub struct SyncCandidate {
    pub item: CatalogItem,
    pub parent: Option<Arc<CatalogItem>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_from_json(json: serde_json::Value) -> CatalogItem {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn value_union_resolves_to_text() {
        assert_eq!(AttrValue::Bool(true).as_text(), "Да");
        assert_eq!(AttrValue::Bool(false).as_text(), "Нет");
        assert_eq!(AttrValue::Number(42.0).as_text(), "42");
        assert_eq!(AttrValue::Text("  Хлопок ".into()).as_text(), "Хлопок");
        assert_eq!(
            AttrValue::Reference(ReferenceValue {
                name: "Синий".into(),
                cat_id: None
            })
            .as_text(),
            "Синий"
        );
    }

    #[test]
    fn truthy_accepts_platform_variants() {
        assert!(AttrValue::Bool(true).is_truthy());
        assert!(AttrValue::Text("Да".into()).is_truthy());
        assert!(AttrValue::Text("true".into()).is_truthy());
        assert!(AttrValue::Number(1.0).is_truthy());
        assert!(!AttrValue::Text("Нет".into()).is_truthy());
        assert!(!AttrValue::Bool(false).is_truthy());
    }

    #[test]
    fn deserializes_mixed_attribute_shapes() {
        let item = item_from_json(serde_json::json!({
            "meta": {"type": "product", "href": "https://x/entity/product/1"},
            "id": "b7a9de30-1111-4a67-9f5e-000000000001",
            "name": "Футболка",
            "attributes": [
                {"name": "Для нац.каталога", "value": true},
                {"name": "Состав", "value": "Хлопок 100%"},
                {"name": "Цвет", "value": {"name": "Белый"}},
            ],
        }));

        assert_eq!(item.kind(), ItemKind::Product);
        assert!(item.attr_flag("Для нац.каталога"));
        assert_eq!(item.attr_text("Состав").as_deref(), Some("Хлопок 100%"));
        assert_eq!(item.attr_text("Цвет").as_deref(), Some("Белый"));
        assert_eq!(item.attr_text("Размер"), None);
    }

    #[test]
    fn parent_id_parsed_from_href_tail() {
        let item = item_from_json(serde_json::json!({
            "meta": {"type": "variant"},
            "id": "b7a9de30-1111-4a67-9f5e-000000000002",
            "name": "Футболка (M)",
            "product": {
                "meta": {"href": "https://x/entity/product/b7a9de30-1111-4a67-9f5e-000000000001"}
            },
        }));

        assert_eq!(
            item.parent_product_id(),
            Some(Uuid::parse_str("b7a9de30-1111-4a67-9f5e-000000000001").unwrap())
        );
    }

    #[test]
    fn malformed_parent_href_yields_none() {
        let item = item_from_json(serde_json::json!({
            "meta": {"type": "variant"},
            "id": "b7a9de30-1111-4a67-9f5e-000000000002",
            "name": "Футболка (M)",
            "product": {"meta": {"href": "not-a-url"}},
        }));

        assert_eq!(item.parent_product_id(), None);
    }
}
