//! Category resolution diagnostics

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::AppState;

/// Attribute summary in the diagnostic response
#[derive(Debug, Serialize)]
pub struct AttributeSummary {
    pub id: u64,
    pub name: String,
}

/// Diagnostic view of category resolution for a tariff code
#[derive(Debug, Serialize)]
pub struct DebugCategoriesResponse {
    pub tariff_code: String,
    /// Raw registry candidates (empty when the lookup fails)
    pub registry_categories: Vec<serde_json::Value>,
    /// The category the resolver would pick
    pub selected_category: u32,
    /// Sample of the selected category's mandatory attributes
    pub required_attributes_sample: Vec<AttributeSummary>,
}

/// GET /debug/categories/{tariff}
///
/// Shows what the registry knows about a tariff code next to what the
/// resolver would decide, for diagnosing mapping-table gaps.
pub async fn debug_categories(
    State(state): State<AppState>,
    Path(tariff_code): Path<String>,
) -> Json<DebugCategoriesResponse> {
    let registry_categories = match state.registry.fetch_categories(&tariff_code).await {
        Ok(categories) => categories
            .iter()
            .map(|c| {
                serde_json::json!({
                    "cat_id": c.cat_id,
                    "category_name": c.category_name,
                    "category_active": c.category_active,
                })
            })
            .collect(),
        Err(e) => {
            tracing::warn!(tariff_code = %tariff_code, error = %e, "category lookup failed");
            Vec::new()
        }
    };

    let selected_category = state.resolver.resolve_category(&tariff_code, "").await;

    let required_attributes_sample = match state
        .registry
        .fetch_attributes(selected_category, "m")
        .await
    {
        Ok(attrs) => attrs
            .into_iter()
            .take(10)
            .map(|a| AttributeSummary {
                id: a.attr_id,
                name: a.attr_name,
            })
            .collect(),
        Err(e) => {
            tracing::warn!(selected_category, error = %e, "attribute lookup failed");
            Vec::new()
        }
    };

    Json(DebugCategoriesResponse {
        tariff_code,
        registry_categories,
        selected_category,
        required_attributes_sample,
    })
}

/// Build debug routes
pub fn debug_routes() -> Router<AppState> {
    Router::new().route("/debug/categories/:tariff", get(debug_categories))
}
