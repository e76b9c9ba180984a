//! Product review and card preview endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{ExtractedProductData, SubmissionCard, SyncCandidate};
use crate::services::card_builder::build_card_for_category;
use crate::services::select_candidates;
use crate::AppState;

/// Product review list
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ExtractedProductData>,
    pub total_filtered: usize,
    pub total_items: usize,
}

/// Card preview for one candidate
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub product: ExtractedProductData,
    pub card: SubmissionCard,
    pub category_id: u32,
}

/// Fetch the assortment and select sync candidates.
///
/// Inventory failures surface as a 502 and are recorded for the health
/// endpoint; no partial result is returned.
pub(crate) async fn load_candidates(
    state: &AppState,
) -> Result<(usize, Vec<SyncCandidate>), ApiError> {
    match state.inventory.fetch_all().await {
        Ok(items) => {
            let total = items.len();
            let candidates = select_candidates(items, &state.config.fields.sync_flag);
            Ok((total, candidates))
        }
        Err(e) => {
            tracing::warn!(error = %e, "assortment fetch failed");
            *state.last_error.write().await = Some(e.to_string());
            Err(ApiError::BadGateway(format!(
                "inventory fetch failed: {}",
                e
            )))
        }
    }
}

/// Candidate by positional index, as shown in the review list
pub(crate) fn candidate_at(
    candidates: Vec<SyncCandidate>,
    index: usize,
) -> Result<SyncCandidate, ApiError> {
    let len = candidates.len();
    candidates.into_iter().nth(index).ok_or_else(|| {
        ApiError::NotFound(format!("product index {} out of range ({})", index, len))
    })
}

/// GET /products
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<ProductListResponse>> {
    let (total_items, candidates) = load_candidates(&state).await?;

    let mut products = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        products.push(state.extractor.extract(candidate).await);
    }

    Ok(Json(ProductListResponse {
        total_filtered: products.len(),
        total_items,
        products,
    }))
}

/// GET /products/{index}/preview
pub async fn preview_card(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<PreviewResponse>> {
    let (_, candidates) = load_candidates(&state).await?;
    let candidate = candidate_at(candidates, index)?;

    let product = state.extractor.extract(&candidate).await;
    let category_id = state
        .resolver
        .resolve_category(&product.tariff_code, &product.product_type)
        .await;
    let card = build_card_for_category(&product, category_id);

    Ok(Json(PreviewResponse {
        product,
        card,
        category_id,
    }))
}

/// Build product routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:index/preview", get(preview_card))
}
