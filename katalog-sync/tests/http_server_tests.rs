//! HTTP surface integration tests
//!
//! Drives the axum router directly; upstream systems are unreachable
//! loopback endpoints, so these tests exercise routing, status mapping and
//! the error envelope without network dependencies.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tower::ServiceExt;

use katalog_sync::config::{AppConfig, FieldNames};
use katalog_sync::services::CategoryMapping;
use katalog_sync::{build_router, AppState};

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        // unroutable loopback port: every upstream call fails fast
        inventory_base_url: "http://127.0.0.1:9".to_string(),
        inventory_token: "test-token".to_string(),
        inventory_page_limit: 10,
        inventory_timeout: Duration::from_secs(1),
        registry_base_url: "http://127.0.0.1:9".to_string(),
        registry_api_key: "test-key".to_string(),
        registry_timeout: Duration::from_secs(1),
        mapping_file: PathBuf::from("unused.json"),
        log_level: "info".to_string(),
        fields: FieldNames::default(),
    }
}

fn test_app_state() -> AppState {
    let mapping = CategoryMapping::from_entries(&[(
        "6204",
        &[(215061, "Брюки тканые"), (215064, "Платья")][..],
    )]);
    AppState::new(test_config(), mapping).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_module_identity() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "katalog-sync");
    // inventory is unreachable in tests
    assert_eq!(json["inventory_connected"], false);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn products_surface_upstream_failure_as_502() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
    assert!(json["error"]["message"].as_str().unwrap().contains("inventory"));
}

#[tokio::test]
async fn upstream_failure_is_recorded_for_health() {
    let state = test_app_state();
    let app = build_router(state.clone());

    let _ = app
        .oneshot(
            Request::builder()
                .uri("/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let response = build_router(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_json(response).await;
    assert!(json["last_error"].as_str().is_some());
}

#[tokio::test]
async fn feed_status_maps_registry_failure_to_502() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/feeds/12345")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
