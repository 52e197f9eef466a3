use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use marquee_api::{app, AppState};
use marquee_core::{HoldDuration, MemoryLedger, TicketHoldingService};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let holds = TicketHoldingService::new(Arc::new(MemoryLedger::new()), HoldDuration::default());
    app(AppState { holds })
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn test_hold_find_release_flow() {
    let app = test_app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/holds",
        Some(json!({ "customerId": "alice", "showtimeId": "s1", "ticketIds": ["t1", "t2"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = call(
        &app,
        Method::POST,
        "/v1/holds",
        Some(json!({ "customerId": "bob", "showtimeId": "s1", "ticketIds": ["t2", "t3"] })),
    )
    .await;
    assert_eq!(body, json!({ "success": false }));

    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/holds/find",
        Some(json!({ "showtimeId": "s1", "customerId": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["t1", "t2"]));

    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/holds/release",
        Some(json!({ "showtimeId": "s1", "customerId": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (_, body) = call(
        &app,
        Method::POST,
        "/v1/holds/find",
        Some(json!({ "showtimeId": "s1", "customerId": "alice" })),
    )
    .await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_empty_ticket_list_is_bad_request() {
    let app = test_app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/v1/holds",
        Some(json!({ "customerId": "alice", "showtimeId": "s1", "ticketIds": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ticket"));
}

#[tokio::test]
async fn test_hold_duration_can_be_tuned() {
    let app = test_app();

    let (status, body) = call(&app, Method::GET, "/v1/admin/hold-duration", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "holdDurationMs": 900000 }));

    let (status, body) = call(
        &app,
        Method::PUT,
        "/v1/admin/hold-duration",
        Some(json!({ "holdDurationMs": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "holdDurationMs": 1000 }));

    let (status, _) = call(
        &app,
        Method::PUT,
        "/v1/admin/hold-duration",
        Some(json!({ "holdDurationMs": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(&test_app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
