//! katalog-sync - inventory → national registry catalog synchronization
//!
//! Pulls products and variants from the inventory platform, resolves each
//! one to a registry category, validates controlled-vocabulary attributes
//! and serves a small HTTP surface for reviewing, submitting and tracking
//! registry submission cards.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use katalog_sync::config::AppConfig;
use katalog_sync::services::CategoryMapping;
use katalog_sync::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Resolve configuration before tracing so the chosen log level applies;
    // RUST_LOG still wins when set
    let toml_config = katalog_common::config::load_or_default()?;
    let config = AppConfig::resolve(&toml_config).context("configuration resolution failed")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting katalog-sync");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // The mapping table is required; a missing file is a fatal startup error
    let mapping = CategoryMapping::load(&config.mapping_file)
        .context("category mapping table unavailable")?;
    info!(
        entries = mapping.len(),
        file = %config.mapping_file.display(),
        "category mapping table loaded"
    );

    let bind_addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, mapping)?;
    let app = katalog_sync::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
