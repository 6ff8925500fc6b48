//! HTTP-level tests for the bulk ingest and activity-log endpoints.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, build_test_app_with, get, post_json, post_raw, RejectAll};
use innkeep_pipeline::ActivityLogStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn room(code: &str) -> Value {
    json!({
        "property_code": "HTL1",
        "room_code": code,
        "name": "Deluxe Twin",
        "capacity": 2
    })
}

fn plan(code: &str) -> Value {
    json!({
        "property_code": "HTL1",
        "plan_code": code,
        "room_code": "TW",
        "name": "Breakfast included",
        "min_stay": 1,
        "meal_type": "breakfast"
    })
}

fn price(date: &str) -> Value {
    json!({
        "property_code": "HTL1",
        "plan_code": "BB",
        "room_code": "TW",
        "date": date,
        "adult_count": 2,
        "amount": 18000
    })
}

fn stock(date: &str) -> Value {
    json!({
        "property_code": "HTL1",
        "room_code": "TW",
        "date": date,
        "stock": 5
    })
}

// ---------------------------------------------------------------------------
// Acceptance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn room_batch_is_accepted_and_logged() {
    let app = build_test_app();
    let body = json!([room("TW"), room("DB")]);

    let response = post_json(app.router.clone(), "/api/v1/bulk/rooms", Some("1"), &body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Request accepted successfully!");
    assert_eq!(json["data"]["service_kind"], "ROOM");
    assert_eq!(json["data"]["change_type"], "Master");
    assert_eq!(json["data"]["wholesaler"], "tl");
    assert_eq!(json["data"]["row_count"], 2);

    app.pipeline.wait_idle().await;
    let id = json["data"]["activity_log_id"].as_i64().unwrap();
    let record = app.store.find(id).await.unwrap().unwrap();
    assert_eq!(record.host_url, "feeds.example.test");
    assert_eq!(record.is_success, Some(true));
}

#[tokio::test]
async fn host_falls_back_to_uri_authority() {
    let app = build_test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("http://feeds.h2.example.test/api/v1/bulk/rooms")
        .header("x-wholesaler-id", "1")
        .body(Body::from(serde_json::to_vec(&json!([room("TW")])).unwrap()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["data"]["activity_log_id"].as_i64().unwrap();

    let record = app.store.find(id).await.unwrap().unwrap();
    assert_eq!(record.host_url, "feeds.h2.example.test");
}

#[tokio::test]
async fn every_domain_route_accepts_its_rows() {
    let app = build_test_app();
    let cases = [
        ("/api/v1/bulk/rooms", json!([room("TW")]), "ROOM", "Master"),
        ("/api/v1/bulk/plans", json!([plan("BB")]), "PLAN", "Master"),
        ("/api/v1/bulk/prices", json!([price("2026-11-01")]), "PRICE", "Differential"),
        ("/api/v1/bulk/stocks", json!([stock("2026-11-01")]), "STOCK", "Differential"),
    ];

    for (uri, body, kind, change) in cases {
        let response = post_json(app.router.clone(), uri, Some("temairazu"), &body).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["data"]["service_kind"], kind);
        assert_eq!(json["data"]["change_type"], change);
    }

    app.pipeline.wait_idle().await;
    assert_eq!(app.store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn empty_array_is_accepted() {
    let app = build_test_app();
    let response = post_raw(app.router.clone(), "/api/v1/bulk/stocks", Some("3"), "[]").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["row_count"], 0);
}

#[tokio::test]
async fn processor_failure_still_returns_ok() {
    let app = build_test_app_with(Arc::new(RejectAll("duplicate code")));
    let body = json!([room("TW")]);

    let response = post_json(app.router.clone(), "/api/v1/bulk/rooms", Some("2"), &body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["data"]["activity_log_id"].as_i64().unwrap();

    app.pipeline.wait_idle().await;

    let response = get(app.router.clone(), &format!("/api/v1/bulk/activity-logs/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_success"], false);
    assert_eq!(json["data"]["error_message"], "duplicate code");
}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_element_returns_422_with_indexed_violations() {
    let app = build_test_app();
    let body = json!([room("TW"), {"property_code": "HTL1", "name": "Suite", "capacity": 2}]);

    let response = post_json(app.router.clone(), "/api/v1/bulk/rooms", Some("1"), &body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let violations = json["violations"].as_object().unwrap();
    assert_eq!(violations.keys().collect::<Vec<_>>(), vec!["1"]);
    assert_eq!(json["violations"]["1"][0]["field"], "room_code");
    assert_eq!(json["violations"]["1"][0]["rule"], "required");

    assert_eq!(app.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn mistyped_field_is_named_alongside_other_violations() {
    let app = build_test_app();
    let body = json!([{"property_code": "HTL1", "date": "2026-02-30", "stock": -5}]);

    let response = post_json(app.router.clone(), "/api/v1/bulk/stocks", Some("1"), &body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    let found: Vec<(&str, &str)> = json["violations"]["0"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| (v["field"].as_str().unwrap(), v["rule"].as_str().unwrap()))
        .collect();
    assert_eq!(
        found,
        vec![("date", "type"), ("room_code", "required"), ("stock", "range")]
    );
}

#[tokio::test]
async fn non_array_body_returns_400_malformed() {
    let app = build_test_app();
    let response = post_raw(
        app.router.clone(),
        "/api/v1/bulk/plans",
        Some("1"),
        r#"{"plan_code": "BB"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "MALFORMED_PAYLOAD");
    assert_eq!(app.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn missing_wholesaler_header_returns_400() {
    let app = build_test_app();
    let response = post_json(app.router.clone(), "/api/v1/bulk/rooms", None, &json!([])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "MISSING_WHOLESALER");
}

#[tokio::test]
async fn unknown_wholesaler_returns_400() {
    let app = build_test_app();
    let response =
        post_json(app.router.clone(), "/api/v1/bulk/rooms", Some("99"), &json!([])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "UNKNOWN_WHOLESALER");
}

#[tokio::test]
async fn unsupported_wholesaler_for_prices_returns_400() {
    let app = build_test_app();
    let body = json!([price("2026-11-01")]);

    let response = post_json(app.router.clone(), "/api/v1/bulk/prices", Some("3"), &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNSUPPORTED_WHOLESALER");
    assert_eq!(
        json["error"],
        "Wholesaler 'neppan' is not supported for PRICE ingestion"
    );
    assert_eq!(app.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn oversized_body_returns_413() {
    let app = build_test_app();
    let huge = vec![b' '; 128 * 1024];

    let response = post_raw(app.router.clone(), "/api/v1/bulk/rooms", Some("1"), huge).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.store.count().await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Activity logs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn activity_logs_list_filters_by_kind() {
    let app = build_test_app();
    post_json(app.router.clone(), "/api/v1/bulk/rooms", Some("1"), &json!([room("TW")])).await;
    post_json(app.router.clone(), "/api/v1/bulk/stocks", Some("1"), &json!([stock("2026-11-01")])).await;
    post_json(app.router.clone(), "/api/v1/bulk/stocks", Some("1"), &json!([])).await;
    app.pipeline.wait_idle().await;

    let response = get(app.router.clone(), "/api/v1/bulk/activity-logs?service_kind=stock").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert!(data.iter().all(|log| log["service_kind"] == "STOCK"));

    let response = get(app.router.clone(), "/api/v1/bulk/activity-logs?limit=1").await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn activity_logs_list_rejects_unknown_kind() {
    let app = build_test_app();
    let response = get(app.router.clone(), "/api/v1/bulk/activity-logs?service_kind=hotel").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unknown_activity_log_returns_404() {
    let app = build_test_app();
    let response = get(app.router.clone(), "/api/v1/bulk/activity-logs/4242").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "BulkActivityLog with id 4242 not found");
}
