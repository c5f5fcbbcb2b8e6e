//! Common test utilities

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

use total_economy::api::{self, AppState};
use total_economy::{EconomyConfig, EconomyService, InMemoryProfiles};

pub const ADMIN_KEY: &str = "test_admin_key";

/// Router over a fresh accounts file, plus the economy behind it
pub struct TestApp {
    pub router: Router,
    pub economy: EconomyService,
    // Keeps the accounts file alive for the duration of the test
    pub dir: TempDir,
}

/// Setup a test app with the given economy rules and the admin key enabled
pub async fn setup_test_app(config: EconomyConfig) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let profiles = Arc::new(InMemoryProfiles::new());

    let economy = EconomyService::open(dir.path().join("accounts.json"), config, profiles.clone())
        .await
        .expect("Failed to open economy");

    let state = AppState::new(economy.clone(), profiles).with_admin_api_key(ADMIN_KEY);
    let router = api::build_app(state, false);

    TestApp {
        router,
        economy,
        dir,
    }
}

/// Send a JSON request to an `/api/v1` route and decode the JSON response
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<Value>,
    admin_key: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(format!("/api/v1{uri}"));
    if let Some(key) = admin_key {
        builder = builder.header("X-API-Key", key);
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// Decimal field of a JSON response
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal should serialize as a string")
        .parse()
        .unwrap()
}
