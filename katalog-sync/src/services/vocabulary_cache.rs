//! Controlled-vocabulary cache and validators
//!
//! The registry publishes per-category controlled vocabularies (valid
//! product kinds) and one global color vocabulary through its attribute
//! metadata endpoint. Values are fetched lazily on first use and memoized
//! for the process lifetime: no TTL, a fetched key is never re-fetched.
//! The fetch-or-return path holds the cache lock across the fetch, so a
//! concurrent first access for the same key cannot fetch twice.
//!
//! A failed fetch memoizes nothing: the call yields an empty vocabulary and
//! the next call retries.

use crate::services::registry_client::{RegistryClient, RegistryError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Registry attribute id of the color vocabulary
pub const COLOR_ATTR_ID: u64 = 36;
/// Registry attribute id of the product-kind vocabulary
pub const KIND_ATTR_ID: u64 = 12;
/// The color vocabulary is global; the registry exposes it under the
/// apparel category.
pub const COLOR_PRESET_CATEGORY: u32 = 30933;

/// Process-lifetime cache of controlled vocabularies
pub struct VocabularyCache {
    registry: Arc<RegistryClient>,
    colors: Mutex<Option<Arc<HashSet<String>>>>,
    kinds: Mutex<HashMap<u32, Arc<HashSet<String>>>>,
}

impl VocabularyCache {
    pub fn new(registry: Arc<RegistryClient>) -> Self {
        Self {
            registry,
            colors: Mutex::new(None),
            kinds: Mutex::new(HashMap::new()),
        }
    }

    /// The global color vocabulary (uppercase)
    pub async fn color_preset(&self) -> Arc<HashSet<String>> {
        let mut cached = self.colors.lock().await;
        if let Some(preset) = cached.as_ref() {
            return Arc::clone(preset);
        }

        match self.fetch_vocabulary(COLOR_PRESET_CATEGORY, COLOR_ATTR_ID).await {
            Some(preset) => {
                let preset = Arc::new(preset);
                *cached = Some(Arc::clone(&preset));
                tracing::info!(values = preset.len(), "color vocabulary cached");
                preset
            }
            None => Arc::new(HashSet::new()),
        }
    }

    /// The product-kind vocabulary of one category (uppercase)
    pub async fn kind_preset(&self, category_id: u32) -> Arc<HashSet<String>> {
        let mut cached = self.kinds.lock().await;
        if let Some(preset) = cached.get(&category_id) {
            return Arc::clone(preset);
        }

        match self.fetch_vocabulary(category_id, KIND_ATTR_ID).await {
            Some(preset) => {
                let preset = Arc::new(preset);
                cached.insert(category_id, Arc::clone(&preset));
                tracing::info!(
                    category_id,
                    values = preset.len(),
                    "kind vocabulary cached"
                );
                preset
            }
            None => Arc::new(HashSet::new()),
        }
    }

    /// Check a color value against the global vocabulary.
    ///
    /// Empty input is immediately invalid with an empty vocabulary; no
    /// network call is made.
    pub async fn validate_color(&self, value: &str) -> (bool, Arc<HashSet<String>>) {
        let value = value.trim();
        if value.is_empty() {
            return (false, Arc::new(HashSet::new()));
        }
        let preset = self.color_preset().await;
        let valid = preset.contains(&value.to_uppercase());
        (valid, preset)
    }

    /// Check a product-kind value against a category's vocabulary.
    ///
    /// Empty input or a missing category id is immediately invalid with an
    /// empty vocabulary; no network call is made.
    pub async fn validate_kind(
        &self,
        value: &str,
        category_id: Option<u32>,
    ) -> (bool, Arc<HashSet<String>>) {
        let value = value.trim();
        let Some(category_id) = category_id else {
            return (false, Arc::new(HashSet::new()));
        };
        if value.is_empty() {
            return (false, Arc::new(HashSet::new()));
        }
        let preset = self.kind_preset(category_id).await;
        let valid = preset.contains(&value.to_uppercase());
        (valid, preset)
    }

    /// Fetch one vocabulary from the registry metadata endpoint.
    ///
    /// `None` means the fetch failed (nothing is memoized); `Some(empty)`
    /// means the registry answered but the attribute carries no preset.
    async fn fetch_vocabulary(&self, category_id: u32, attr_id: u64) -> Option<HashSet<String>> {
        let attrs = match self.registry.fetch_attributes(category_id, "a").await {
            Ok(attrs) => attrs,
            Err(e) => {
                log_fetch_failure(category_id, attr_id, &e);
                return None;
            }
        };

        let Some(attr) = attrs.into_iter().find(|a| a.attr_id == attr_id) else {
            tracing::warn!(category_id, attr_id, "attribute not present for category");
            return Some(HashSet::new());
        };

        if let Some(preset) = attr.attr_preset {
            return Some(uppercase_set(preset));
        }

        if let Some(url) = attr.preset_url {
            return match self.registry.fetch_preset(&url).await {
                Ok(values) => Some(uppercase_set(values)),
                Err(e) => {
                    log_fetch_failure(category_id, attr_id, &e);
                    None
                }
            };
        }

        Some(HashSet::new())
    }
}

fn uppercase_set(values: Vec<String>) -> HashSet<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn log_fetch_failure(category_id: u32, attr_id: u64, error: &RegistryError) {
    tracing::warn!(category_id, attr_id, error = %error, "vocabulary fetch failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cache() -> VocabularyCache {
        let registry = Arc::new(
            RegistryClient::new("http://127.0.0.1:9", "test-key", Duration::from_secs(1)).unwrap(),
        );
        VocabularyCache::new(registry)
    }

    #[tokio::test]
    async fn empty_color_short_circuits() {
        let cache = cache();
        let (valid, preset) = cache.validate_color("").await;
        assert!(!valid);
        assert!(preset.is_empty());
    }

    #[tokio::test]
    async fn missing_category_short_circuits() {
        let cache = cache();
        let (valid, preset) = cache.validate_kind("ПЛАТЬЕ", None).await;
        assert!(!valid);
        assert!(preset.is_empty());
    }

    #[tokio::test]
    async fn whitespace_kind_short_circuits() {
        let cache = cache();
        let (valid, preset) = cache.validate_kind("   ", Some(215009)).await;
        assert!(!valid);
        assert!(preset.is_empty());
    }

    #[test]
    fn uppercase_set_trims_and_drops_blanks() {
        let set = uppercase_set(vec![
            " красный ".to_string(),
            "Синий".to_string(),
            "".to_string(),
        ]);
        assert!(set.contains("КРАСНЫЙ"));
        assert!(set.contains("СИНИЙ"));
        assert_eq!(set.len(), 2);
    }
}
