//! Submission and feed-status endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::products::{candidate_at, load_candidates};
use crate::error::{ApiError, ApiResult};
use crate::models::{FeedStatus, FieldOverrides};
use crate::services::submission::{SubmissionError, SubmissionTracker};
use crate::AppState;

/// Successful submission response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub feed_id: String,
    pub product_name: String,
}

/// POST /products/{index}/submit
///
/// Optional body: field overrides (color, product kind, size only; empty
/// values are ignored), merged in before the required-field check and card
/// assembly.
pub async fn submit_product(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    overrides: Option<Json<FieldOverrides>>,
) -> ApiResult<Json<SubmitResponse>> {
    let (_, candidates) = load_candidates(&state).await?;
    let candidate = candidate_at(candidates, index)?;

    let mut product = state.extractor.extract(&candidate).await;
    if let Some(Json(overrides)) = overrides {
        overrides.apply(&mut product);
    }

    // pure check, before any registry I/O
    SubmissionTracker::check_required(&product).map_err(|e| match e {
        SubmissionError::MissingField(field) => {
            ApiError::BadRequest(format!("missing required field: {}", field))
        }
        other => ApiError::Internal(other.to_string()),
    })?;

    let card = state.card_builder.build(&product, None).await;
    let outcome = state.tracker.submit(&card).await;

    match outcome.tracking_id {
        Some(feed_id) if outcome.accepted => Ok(Json(SubmitResponse {
            success: true,
            feed_id,
            product_name: product.name,
        })),
        _ => {
            let message = outcome
                .error
                .unwrap_or_else(|| "submission failed".to_string());
            *state.last_error.write().await = Some(message.clone());
            Err(ApiError::BadGateway(message))
        }
    }
}

/// GET /feeds/{feed_id}
pub async fn feed_status(
    State(state): State<AppState>,
    Path(feed_id): Path<String>,
) -> ApiResult<Json<FeedStatus>> {
    let status = state
        .tracker
        .poll_status(&feed_id)
        .await
        .map_err(|e| ApiError::BadGateway(e.to_string()))?;
    Ok(Json(status))
}

/// Build submission routes
pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/products/:index/submit", post(submit_product))
        .route("/feeds/:feed_id", get(feed_status))
}
