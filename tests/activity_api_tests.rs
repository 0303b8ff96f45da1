// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity listing, reflection and certificate endpoint tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::send;

const PDF: &[u8] = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj\n";

async fn create_activity(app: &Router, title: &str, extra: Value) -> String {
    let mut body = json!({ "title": title, "ce_awarded": 1.0 });
    if let (Some(map), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        map.extend(extra.clone());
    }
    let (status, body) = send(app, "POST", "/api/activities", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create activity: {}", body);
    body["id"].as_str().unwrap().to_string()
}

async fn put_bytes(app: &Router, uri: &str, bytes: &'static [u8]) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(uri)
                // Deliberately misleading; the stored type comes from the bytes
                .header(header::CONTENT_TYPE, "image/png")
                .body(Body::from(bytes))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn titles(body: &Value) -> Vec<String> {
    let mut titles: Vec<String> = body["activities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect();
    titles.sort();
    titles
}

/// One activity per status as of 2025-06-15.
async fn seed_statuses(app: &Router) {
    create_activity(app, "completed", json!({ "completed": true, "completion_date": "2025-05-01" })).await;
    create_activity(app, "expired", json!({ "expiration_date": "2025-06-14" })).await;
    create_activity(app, "final day", json!({ "expiration_date": "2025-06-15" })).await;
    create_activity(app, "soon", json!({ "expiration_date": "2025-07-15" })).await;
    create_activity(app, "later", json!({ "expiration_date": "2025-07-16" })).await;
    create_activity(app, "open ended", json!({})).await;
}

#[tokio::test]
async fn test_list_classifies_each_activity() {
    let (app, _) = common::create_test_app();
    seed_statuses(&app).await;

    let (status, body) = send(&app, "GET", "/api/activities?as_of=2025-06-15", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 6);
    assert_eq!(body["filter"], "all");

    for activity in body["activities"].as_array().unwrap() {
        let expected = match activity["title"].as_str().unwrap() {
            "completed" => "completed",
            "expired" => "expired",
            "final day" => "final_day",
            "soon" => "expiring_soon",
            "later" | "open ended" => "still_valid",
            other => panic!("unexpected activity {}", other),
        };
        assert_eq!(activity["status"], expected, "{}", activity["title"]);
    }
}

#[tokio::test]
async fn test_status_filter_query() {
    let (app, _) = common::create_test_app();
    seed_statuses(&app).await;

    let (_, body) = send(
        &app,
        "GET",
        "/api/activities?as_of=2025-06-15&status=still_valid",
        None,
    )
    .await;
    assert_eq!(body["filter"], "still_valid");
    assert_eq!(titles(&body), vec!["later", "open ended"]);

    let (_, body) = send(
        &app,
        "GET",
        "/api/activities?as_of=2025-06-15&status=final_day",
        None,
    )
    .await;
    assert_eq!(titles(&body), vec!["final day"]);
}

#[tokio::test]
async fn test_filter_and_search_fall_back_to_session() {
    let (app, _) = common::create_test_app();
    seed_statuses(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/session/commands",
        Some(json!({ "type": "set_activity_filter", "filter": "expired" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/activities?as_of=2025-06-15", None).await;
    assert_eq!(body["filter"], "expired");
    assert_eq!(titles(&body), vec!["expired"]);

    // An explicit status overrides the session filter
    let (_, body) = send(&app, "GET", "/api/activities?as_of=2025-06-15&status=all", None).await;
    assert_eq!(body["total"], 6);

    send(
        &app,
        "POST",
        "/api/session/commands",
        Some(json!({ "type": "set_activity_filter", "filter": "all" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/session/commands",
        Some(json!({ "type": "set_search_text", "text": "  DAY " })),
    )
    .await;

    let (_, body) = send(&app, "GET", "/api/activities?as_of=2025-06-15", None).await;
    assert_eq!(titles(&body), vec!["final day"]);
}

#[tokio::test]
async fn test_search_text_too_long() {
    let (app, _) = common::create_test_app();
    let uri = format!("/api/activities?q={}", "x".repeat(101));
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_search_limit_counts_characters() {
    let (app, _) = common::create_test_app();
    create_activity(&app, "Éthique médicale", json!({})).await;

    // 60 characters, 120 bytes
    let uri = format!("/api/activities?q={}", "%C3%A9".repeat(60));
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["total"], 0);

    let (status, body) = send(&app, "GET", "/api/activities?q=%C3%A9thique", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Éthique médicale"]);
}

#[tokio::test]
async fn test_long_session_search_text_rejected() {
    let (app, _) = common::create_test_app();
    create_activity(&app, "Ethics", json!({})).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/session/commands",
        Some(json!({ "type": "set_search_text", "text": "a".repeat(150) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    // The session is unchanged and listing keeps working
    let (_, session) = send(&app, "GET", "/api/session", None).await;
    assert_eq!(session["search_text"], "");
    let (status, body) = send(&app, "GET", "/api/activities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    // Exactly at the limit is accepted
    let (status, _) = send(
        &app,
        "POST",
        "/api/session/commands",
        Some(json!({ "type": "set_search_text", "text": "é".repeat(100) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/activities", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_filter_by_credential() {
    let (app, _) = common::create_test_app();
    let cred = common::create_credential(&app, "RN License", 24.0).await;
    create_activity(&app, "linked", json!({ "credential_id": cred })).await;
    create_activity(&app, "unlinked", json!({})).await;

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/activities?credential_id={}", cred),
        None,
    )
    .await;
    assert_eq!(titles(&body), vec!["linked"]);
}

#[tokio::test]
async fn test_activity_rejects_unknown_links() {
    let (app, _) = common::create_test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/activities",
        Some(json!({
            "title": "Orphan",
            "ce_awarded": 1.0,
            "credential_id": "00000000-0000-0000-0000-000000000000"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_activity_validation() {
    let (app, _) = common::create_test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/activities",
        Some(json!({ "title": "   ", "ce_awarded": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/activities",
        Some(json!({ "title": "Negative", "ce_awarded": -2.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_activity_marks_completed() {
    let (app, _) = common::create_test_app();
    let id = create_activity(&app, "Ethics", json!({ "expiration_date": "2025-06-20" })).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/activities/{}", id),
        Some(json!({
            "title": "Ethics",
            "ce_awarded": 2.0,
            "completed": true,
            "completion_date": "2025-06-10",
            "expiration_date": "2025-06-20"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["ce_awarded"], 2.0);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/activities/{}?as_of=2025-06-15", id),
        None,
    )
    .await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["completion_date"], "2025-06-10");
}

#[tokio::test]
async fn test_reflections() {
    let (app, _) = common::create_test_app();
    let id = create_activity(&app, "Wound care", json!({})).await;
    let uri = format!("/api/activities/{}/reflections", id);

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "surprises": "  ", "new_info": null })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "three_main_points": "Debridement, dressings, offloading" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["activity_id"], id.as_str());

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_certificate_upload_is_sniffed() {
    let (app, _) = common::create_test_app();
    let id = create_activity(&app, "Pharmacology", json!({})).await;
    let uri = format!("/api/activities/{}/certificate", id);

    let (status, body) = put_bytes(&app, &uri, PDF).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["file_type"], "pdf");
    assert_eq!(body["mime_type"], "application/pdf");
    assert_eq!(body["is_image"], false);
    assert_eq!(body["size_bytes"], PDF.len() as u64);
    assert!(body["uploaded_at"].as_str().unwrap().ends_with('Z'));

    let response = app
        .clone()
        .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "inline; filename=\"certificate.pdf\""
    );
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    assert_eq!(&bytes[..], PDF);
}

#[tokio::test]
async fn test_certificate_unknown_type_rejected() {
    let (app, _) = common::create_test_app();
    let id = create_activity(&app, "Pharmacology", json!({})).await;
    let uri = format!("/api/activities/{}/certificate", id);

    let (status, body) = put_bytes(&app, &uri, b"plain text, not a certificate").await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "unsupported_media_type");

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_certificate_for_missing_activity() {
    let (app, _) = common::create_test_app();
    let (status, _) = put_bytes(
        &app,
        "/api/activities/00000000-0000-0000-0000-000000000000/certificate",
        PDF,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_activity_cascades() {
    let (app, state) = common::create_test_app();
    let id = create_activity(&app, "Infection control", json!({})).await;
    send(
        &app,
        "POST",
        &format!("/api/activities/{}/reflections", id),
        Some(json!({ "general_reflection": "Useful refresher" })),
    )
    .await;
    let (status, _) = put_bytes(&app, &format!("/api/activities/{}/certificate", id), PDF).await;
    assert_eq!(status, StatusCode::OK);

    // Open it in the editor so the delete also dismisses the sheet
    send(
        &app,
        "POST",
        "/api/session/commands",
        Some(json!({
            "type": "present",
            "presentation": { "kind": "editing", "entity": "activity", "id": id }
        })),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/api/activities/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let uuid = id.parse().unwrap();
    assert!(state.db.get_activity(uuid).is_none());
    assert!(state.db.list_reflections(uuid).is_empty());
    assert!(state.db.get_certificate(uuid).is_none());

    let (_, session) = send(&app, "GET", "/api/session", None).await;
    assert_eq!(session["presentation"]["kind"], "none");

    let (status, _) = send(&app, "GET", &format!("/api/activities/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
