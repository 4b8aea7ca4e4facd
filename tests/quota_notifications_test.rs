use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use lapak_cms_backend::config::{CloudinaryConfig, QuotaConfig, SignatureAlgorithm};
use lapak_cms_backend::services::signer::UploadSigner;
use lapak_cms_backend::services::usage::{UsageError, UsageReporter};
use lapak_cms_backend::utils::auth::Claims;
use lapak_cms_backend::{AppState, create_app};
use sea_orm::Database;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

struct FixedUsage(u64);

#[async_trait]
impl UsageReporter for FixedUsage {
    async fn storage_used_bytes(&self) -> Result<u64, UsageError> {
        Ok(self.0)
    }
}

/// Simulates the usage API changing its response shape.
struct BrokenReport;

#[async_trait]
impl UsageReporter for BrokenReport {
    async fn storage_used_bytes(&self) -> Result<u64, UsageError> {
        Err(UsageError::Shape("no numeric storage.usage field".to_string()))
    }
}

/// Simulates the usage API being down.
struct DownstreamDown;

#[async_trait]
impl UsageReporter for DownstreamDown {
    async fn storage_used_bytes(&self) -> Result<u64, UsageError> {
        Err(UsageError::Upstream("usage API returned 503".to_string()))
    }
}

async fn test_state(usage: Arc<dyn UsageReporter>) -> AppState {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    lapak_cms_backend::infrastructure::database::run_migrations(&db)
        .await
        .unwrap();

    let cloudinary = CloudinaryConfig {
        cloud_name: "demo".to_string(),
        api_key: "key123".to_string(),
        api_secret: "s3cret".to_string(),
        upload_preset: None,
        signature_algorithm: SignatureAlgorithm::Sha1,
    };

    AppState {
        db,
        signer: Arc::new(UploadSigner::new(cloudinary)),
        usage,
        quota: QuotaConfig::default(), // 2 GiB ceiling
    }
}

fn admin_token() -> String {
    let claims = Claims {
        sub: "admin-1".to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        email: None,
        role: None,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"secret"),
    )
    .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_usage_endpoint_classifies_sample() {
    // 1.9 GiB of the 2 GiB plan
    let used = (1.9 * 1024.0 * 1024.0 * 1024.0) as u64;
    let app = create_app(test_state(Arc::new(FixedUsage(used))).await);
    let token = admin_token();

    let response = app.oneshot(get("/api/cloudinary/usage", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["percent"], 95);
    assert_eq!(body["tier"], "critical");
    assert_eq!(body["used_bytes"].as_u64().unwrap(), used);
}

#[tokio::test]
async fn test_refresh_creates_exactly_one_notification_per_day() {
    let used = (1.9 * 1024.0 * 1024.0 * 1024.0) as u64;
    let app = create_app(test_state(Arc::new(FixedUsage(used))).await);
    let token = admin_token();

    // first refresh of the day inserts
    let response = app
        .clone()
        .oneshot(post("/api/notifications/refresh", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["pct"], 95);
    assert_eq!(body["tier"], "critical");
    assert_eq!(body["notified"], true);

    // second refresh is a dedup hit
    let response = app
        .clone()
        .oneshot(post("/api/notifications/refresh", &token))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["notified"], false);

    let response = app
        .oneshot(get("/api/notifications", &token))
        .await
        .unwrap();
    let items = json_body(response).await;
    let items = items.as_array().unwrap().clone();
    assert_eq!(items.len(), 1);
    assert!(items[0]["title"].as_str().unwrap().contains("95%"));
    assert_eq!(items[0]["type"], "critical");
    assert_eq!(items[0]["is_read"], false);
}

#[tokio::test]
async fn test_refresh_below_warning_writes_nothing() {
    let app = create_app(test_state(Arc::new(FixedUsage(100 * 1024 * 1024))).await);
    let token = admin_token();

    let response = app
        .clone()
        .oneshot(post("/api/notifications/refresh", &token))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["tier"], "ok");
    assert_eq!(body["notified"], false);

    let response = app
        .oneshot(get("/api/notifications", &token))
        .await
        .unwrap();
    assert!(json_body(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_refresh_degrades_gracefully_on_unknown_report_shape() {
    let app = create_app(test_state(Arc::new(BrokenReport)).await);
    let token = admin_token();

    let response = app
        .clone()
        .oneshot(post("/api/notifications/refresh", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["note"], "no storage info");
    assert_eq!(body["notified"], false);
}

#[tokio::test]
async fn test_usage_endpoint_relays_upstream_failure() {
    let app = create_app(test_state(Arc::new(DownstreamDown)).await);
    let token = admin_token();

    let response = app.oneshot(get("/api/cloudinary/usage", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_notification_read_toggle_and_delete() {
    let used = (1.9 * 1024.0 * 1024.0 * 1024.0) as u64;
    let app = create_app(test_state(Arc::new(FixedUsage(used))).await);
    let token = admin_token();

    app.clone()
        .oneshot(post("/api/notifications/refresh", &token))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/notifications", &token))
        .await
        .unwrap();
    let items = json_body(response).await;
    let id = items.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

    // mark read
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/notifications/{id}/read"))
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"is_read":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["is_read"], true);

    // delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/notifications/{id}"))
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/notifications", &token))
        .await
        .unwrap();
    assert!(json_body(response).await.as_array().unwrap().is_empty());
}
