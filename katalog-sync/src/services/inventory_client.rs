//! Inventory platform API client
//!
//! Fetches the assortment (products, variants, bundles, services) with
//! custom attributes and characteristics expanded, paginating until a short
//! page. Also hosts the sync-selection pass: which records go to the
//! registry, and the variant → owning-product pairing that powers attribute
//! inheritance.

use crate::models::{CatalogItem, ItemKind, SyncCandidate};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Inventory client errors
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authorization rejected")]
    Unauthorized,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One assortment page
#[derive(Debug, Default, Deserialize)]
struct AssortmentPage {
    #[serde(default)]
    rows: Vec<CatalogItem>,
}

/// Inventory platform API client
pub struct InventoryClient {
    http: reqwest::Client,
    base_url: String,
    page_limit: usize,
}

impl InventoryClient {
    pub fn new(
        base_url: &str,
        token: &str,
        page_limit: usize,
        timeout: Duration,
    ) -> Result<Self, InventoryError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| InventoryError::Network(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json;charset=utf-8"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| InventoryError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_limit,
        })
    }

    /// Cheap connection/authorization probe
    pub async fn probe(&self) -> bool {
        let url = format!("{}/context/employee", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "inventory probe rejected");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "inventory probe failed");
                false
            }
        }
    }

    /// Fetch one assortment page with attributes and characteristics
    /// expanded
    pub async fn fetch_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CatalogItem>, InventoryError> {
        let url = format!("{}/entity/assortment", self.base_url);

        tracing::debug!(limit, offset, "Fetching assortment page");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("expand", "attributes,characteristics".to_string()),
            ])
            .send()
            .await
            .map_err(|e| InventoryError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(InventoryError::Unauthorized);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InventoryError::Api(status.as_u16(), error_text));
        }

        let page: AssortmentPage = response
            .json()
            .await
            .map_err(|e| InventoryError::Parse(e.to_string()))?;

        tracing::debug!(rows = page.rows.len(), offset, "Assortment page fetched");
        Ok(page.rows)
    }

    /// Fetch the whole assortment, advancing the offset until a short page
    pub async fn fetch_all(&self) -> Result<Vec<CatalogItem>, InventoryError> {
        let mut items = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.fetch_page(self.page_limit, offset).await?;
            let page_len = page.len();
            items.extend(page);

            if page_len < self.page_limit {
                break;
            }
            offset += self.page_limit;
        }

        tracing::info!(total = items.len(), "Assortment loaded");
        Ok(items)
    }
}

/// Select the records bound for the registry and pair variants with their
/// owning products.
///
/// Only products whose sync-flag attribute is set are considered. A flagged
/// product without variants yields itself; a product with variants yields
/// one candidate per variant, each carrying the parent record for
/// inheritance. Bundle and service records never sync.
pub fn select_candidates(items: Vec<CatalogItem>, sync_flag_attr: &str) -> Vec<SyncCandidate> {
    let mut product_order: Vec<Uuid> = Vec::new();
    let mut products: HashMap<Uuid, CatalogItem> = HashMap::new();
    let mut variants_by_product: HashMap<Uuid, Vec<CatalogItem>> = HashMap::new();

    for item in items {
        match item.kind() {
            ItemKind::Product => {
                product_order.push(item.id);
                products.insert(item.id, item);
            }
            ItemKind::Variant => match item.parent_product_id() {
                Some(parent_id) => {
                    variants_by_product.entry(parent_id).or_default().push(item)
                }
                None => {
                    tracing::warn!(variant = %item.id, "variant without resolvable parent, skipped")
                }
            },
            ItemKind::Bundle | ItemKind::Service | ItemKind::Unknown => {}
        }
    }

    let mut candidates = Vec::new();
    for product_id in product_order {
        let Some(product) = products.remove(&product_id) else {
            continue;
        };
        if !product.attr_flag(sync_flag_attr) {
            continue;
        }

        let variants = variants_by_product.remove(&product_id).unwrap_or_default();
        if variants.is_empty() {
            candidates.push(SyncCandidate {
                item: product,
                parent: None,
            });
        } else {
            let parent = Arc::new(product);
            for variant in variants {
                candidates.push(SyncCandidate {
                    item: variant,
                    parent: Some(Arc::clone(&parent)),
                });
            }
        }
    }

    tracing::info!(selected = candidates.len(), "sync candidates selected");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAG: &str = "Для нац.каталога";

    fn product(id: &str, flagged: bool) -> CatalogItem {
        serde_json::from_value(serde_json::json!({
            "meta": {"type": "product"},
            "id": id,
            "name": format!("Товар {}", id),
            "attributes": [{"name": FLAG, "value": flagged}],
        }))
        .unwrap()
    }

    fn variant(id: &str, parent_id: &str) -> CatalogItem {
        serde_json::from_value(serde_json::json!({
            "meta": {"type": "variant"},
            "id": id,
            "name": format!("Вариант {}", id),
            "product": {"meta": {"href": format!("https://x/entity/product/{}", parent_id)}},
        }))
        .unwrap()
    }

    const P1: &str = "b7a9de30-0000-4a67-9f5e-000000000001";
    const P2: &str = "b7a9de30-0000-4a67-9f5e-000000000002";
    const V1: &str = "b7a9de30-0000-4a67-9f5e-000000000011";
    const V2: &str = "b7a9de30-0000-4a67-9f5e-000000000012";

    #[test]
    fn unflagged_products_are_skipped() {
        let candidates = select_candidates(vec![product(P1, false)], FLAG);
        assert!(candidates.is_empty());
    }

    #[test]
    fn flagged_product_without_variants_yields_itself() {
        let candidates = select_candidates(vec![product(P1, true)], FLAG);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].parent.is_none());
    }

    #[test]
    fn variants_carry_parent_link() {
        let items = vec![product(P1, true), variant(V1, P1), variant(V2, P1)];
        let candidates = select_candidates(items, FLAG);

        assert_eq!(candidates.len(), 2);
        for candidate in &candidates {
            assert_eq!(candidate.item.kind(), ItemKind::Variant);
            let parent = candidate.parent.as_ref().unwrap();
            assert_eq!(parent.id.to_string(), P1);
        }
    }

    #[test]
    fn variants_of_unflagged_product_are_skipped() {
        let items = vec![product(P2, false), variant(V1, P2)];
        let candidates = select_candidates(items, FLAG);
        assert!(candidates.is_empty());
    }

    #[test]
    fn candidate_order_follows_product_order() {
        let items = vec![
            product(P1, true),
            product(P2, true),
            variant(V1, P2),
        ];
        let candidates = select_candidates(items, FLAG);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].item.id.to_string(), P1);
        assert_eq!(candidates[1].item.id.to_string(), V1);
    }

    #[test]
    fn bundles_and_services_never_sync() {
        let bundle: CatalogItem = serde_json::from_value(serde_json::json!({
            "meta": {"type": "bundle"},
            "id": P1,
            "name": "Комплект",
            "attributes": [{"name": FLAG, "value": true}],
        }))
        .unwrap();
        assert!(select_candidates(vec![bundle], FLAG).is_empty());
    }
}
