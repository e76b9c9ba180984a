//! Submission and status tracking
//!
//! One synchronous submit per card, one synchronous poll per status check.
//! No retries and no built-in wait: a failed call is terminal for that call
//! and the caller decides whether to re-invoke. The required-field check is
//! pure and runs before any network I/O.

use crate::models::{ExtractedProductData, FeedStatus, SubmissionCard};
use crate::services::registry_client::{RegistryClient, RegistryError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Submission errors
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// A required field is missing; detected before any network call
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The registry call failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Outcome of one submission attempt
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub accepted: bool,
    pub tracking_id: Option<String>,
    pub error: Option<String>,
}

/// Submission and status tracker
pub struct SubmissionTracker {
    registry: Arc<RegistryClient>,
}

impl SubmissionTracker {
    pub fn new(registry: Arc<RegistryClient>) -> Self {
        Self { registry }
    }

    /// Caller-side required-field check. Pure: no I/O, callable before the
    /// card is even built.
    pub fn check_required(data: &ExtractedProductData) -> Result<(), SubmissionError> {
        if data.name.trim().is_empty() {
            return Err(SubmissionError::MissingField("name"));
        }
        if data.tariff_code.trim().is_empty() {
            return Err(SubmissionError::MissingField("tariff_code"));
        }
        Ok(())
    }

    /// Submit one card. A non-2xx response or a response without a feed id
    /// is a terminal failure for this call.
    pub async fn submit(&self, card: &SubmissionCard) -> SubmissionOutcome {
        match self.registry.submit_card(card).await {
            Ok(feed_id) => {
                tracing::info!(feed_id = %feed_id, good_name = %card.good_name, "card submitted");
                SubmissionOutcome {
                    accepted: true,
                    tracking_id: Some(feed_id),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(good_name = %card.good_name, error = %e, "card submission failed");
                SubmissionOutcome {
                    accepted: false,
                    tracking_id: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Fetch the current server-side state of a feed. The caller re-polls;
    /// there is no built-in wait or backoff.
    pub async fn poll_status(&self, feed_id: &str) -> Result<FeedStatus, SubmissionError> {
        let payload = self.registry.feed_status(feed_id).await?;
        Ok(FeedStatus::from_payload(feed_id, payload))
    }
}
