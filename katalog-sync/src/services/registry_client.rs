//! National registry API client
//!
//! Thin request/response boundary over the registry's REST API: category and
//! attribute metadata lookups, card submission and feed-status polling. No
//! retries; every call is a single synchronous round-trip with a fixed
//! timeout. The `result` envelope is unwrapped here so callers see plain
//! payloads.

use crate::models::feed::FeedStatusPayload;
use crate::models::SubmissionCard;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Registry client errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Category record from the registry's category endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryCategory {
    pub cat_id: u32,
    #[serde(default)]
    pub category_name: String,
    #[serde(default = "default_true")]
    pub category_active: bool,
}

/// Attribute record from the registry's attribute metadata endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryAttribute {
    pub attr_id: u64,
    #[serde(default)]
    pub attr_name: String,
    /// Inline controlled-vocabulary preset, when small enough
    #[serde(default)]
    pub attr_preset: Option<Vec<String>>,
    /// Follow-up URL for large presets
    #[serde(default)]
    pub preset_url: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Registry API client
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RegistryClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// GET a registry path and unwrap the `result` envelope
    async fn get_result(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, RegistryError> {
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        };

        tracing::debug!(url = %url, "Registry GET");

        let response = self
            .http
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api(status.as_u16(), error_text));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RegistryError::MalformedResponse(e.to_string()))?;

        body.get("result")
            .cloned()
            .ok_or_else(|| RegistryError::MalformedResponse("missing result field".to_string()))
    }

    /// Categories covering a tariff code
    pub async fn fetch_categories(
        &self,
        tariff_code: &str,
    ) -> Result<Vec<RegistryCategory>, RegistryError> {
        let result = self
            .get_result("/v3/categories", &[("tnved", tariff_code)])
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RegistryError::MalformedResponse(e.to_string()))
    }

    /// Attribute metadata for a category.
    ///
    /// `attr_type` is the registry's attribute-class selector ("a" = all,
    /// "m" = mandatory).
    pub async fn fetch_attributes(
        &self,
        category_id: u32,
        attr_type: &str,
    ) -> Result<Vec<RegistryAttribute>, RegistryError> {
        let cat_id = category_id.to_string();
        let result = self
            .get_result(
                "/v3/attributes",
                &[("cat_id", cat_id.as_str()), ("attr_type", attr_type)],
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RegistryError::MalformedResponse(e.to_string()))
    }

    /// Follow a preset URL and return its values
    pub async fn fetch_preset(&self, preset_url: &str) -> Result<Vec<String>, RegistryError> {
        let result = self.get_result(preset_url, &[]).await?;
        serde_json::from_value(result)
            .map_err(|e| RegistryError::MalformedResponse(e.to_string()))
    }

    /// Submit a card; returns the server-assigned feed (tracking) id.
    ///
    /// A non-2xx response or a response without a feed id is a terminal
    /// failure for this call; no retry.
    pub async fn submit_card(&self, card: &SubmissionCard) -> Result<String, RegistryError> {
        let url = format!("{}/v3/feed", self.base_url);

        tracing::debug!(url = %url, good_name = %card.good_name, "Submitting card");

        let response = self
            .http
            .post(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .json(card)
            .send()
            .await
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api(status.as_u16(), error_text));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RegistryError::MalformedResponse(e.to_string()))?;

        match body.get("result").and_then(|r| r.get("feed_id")) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
            _ => Err(RegistryError::MalformedResponse(
                "missing feed_id in response".to_string(),
            )),
        }
    }

    /// Current processing state of a submitted feed
    pub async fn feed_status(&self, feed_id: &str) -> Result<FeedStatusPayload, RegistryError> {
        let result = self
            .get_result("/v3/feed-status", &[("feed_id", feed_id)])
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RegistryError::MalformedResponse(e.to_string()))
    }
}
