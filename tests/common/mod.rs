// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use ce_cache::config::Config;
use ce_cache::routes::create_router;
use ce_cache::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app over an empty in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default()));
    (create_router(state.clone()), state)
}

/// Send a request with an optional JSON body and decode the JSON reply.
/// Empty replies (204) decode to `Value::Null`; plain-text extractor
/// rejections come back as `Value::String`.
#[allow(dead_code)]
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

/// Create a credential through the API and return its ID.
#[allow(dead_code)]
pub async fn create_credential(app: &Router, name: &str, ces_required: f64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/credentials",
        Some(json!({
            "name": name,
            "credential_type": "license",
            "renewal_period_months": 12,
            "ces_required": ces_required,
            "measurement_unit": "hours"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create credential: {}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Create a renewal period through the API and return its ID.
#[allow(dead_code)]
pub async fn create_period(app: &Router, credential_id: &str, start: &str, end: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/credentials/{}/renewals", credential_id),
        Some(json!({ "start_date": start, "end_date": end })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create period: {}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Switch the session to the Pro tier (no credential limit).
#[allow(dead_code)]
pub async fn upgrade_to_pro(app: &Router) {
    let (status, body) = send(
        app,
        "POST",
        "/api/session/commands",
        Some(json!({ "type": "set_purchase_tier", "tier": "pro" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["purchase_tier"], "pro");
}
