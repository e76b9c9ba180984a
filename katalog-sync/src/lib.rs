//! katalog-sync library interface
//!
//! Exposes the service layer and router construction for integration
//! testing.

pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::extractors::Extractor;
use crate::services::{
    CardBuilder, CategoryMapping, CategoryResolver, InventoryClient, RegistryClient,
    SubmissionTracker, VocabularyCache,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub inventory: Arc<InventoryClient>,
    pub registry: Arc<RegistryClient>,
    pub resolver: Arc<CategoryResolver>,
    pub vocab: Arc<VocabularyCache>,
    pub extractor: Arc<Extractor>,
    pub card_builder: Arc<CardBuilder>,
    pub tracker: Arc<SubmissionTracker>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// Wire the service graph from resolved configuration and a loaded
    /// mapping table
    pub fn new(config: AppConfig, mapping: CategoryMapping) -> katalog_common::Result<Self> {
        let inventory = Arc::new(
            InventoryClient::new(
                &config.inventory_base_url,
                &config.inventory_token,
                config.inventory_page_limit,
                config.inventory_timeout,
            )
            .map_err(|e| katalog_common::Error::Internal(e.to_string()))?,
        );
        let registry = Arc::new(
            RegistryClient::new(
                &config.registry_base_url,
                &config.registry_api_key,
                config.registry_timeout,
            )
            .map_err(|e| katalog_common::Error::Internal(e.to_string()))?,
        );

        let resolver = Arc::new(CategoryResolver::new(mapping, Arc::clone(&registry)));
        let vocab = Arc::new(VocabularyCache::new(Arc::clone(&registry)));
        let extractor = Arc::new(Extractor::new(
            Arc::clone(&resolver),
            Arc::clone(&vocab),
            config.fields.clone(),
        ));
        let card_builder = Arc::new(CardBuilder::new(Arc::clone(&resolver)));
        let tracker = Arc::new(SubmissionTracker::new(Arc::clone(&registry)));

        Ok(Self {
            config: Arc::new(config),
            inventory,
            registry,
            resolver,
            vocab,
            extractor,
            card_builder,
            tracker,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::product_routes())
        .merge(api::submission_routes())
        .merge(api::debug_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
