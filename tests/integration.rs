//! # Integration Tests
//!
//! These tests drive the refund desk router in-process with
//! `tower::ServiceExt::oneshot`. The billing platform is replaced by a small
//! Axum stub bound to an ephemeral local port, so the real `reqwest` client
//! is exercised end to end without network access.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use refund_desk::billing::{LemonSqueezyClient, JSON_API_MEDIA_TYPE};
use refund_desk::create_app;
use refund_desk::refund::RefundOrchestrator;

const API_KEY: &str = "sk_test_123";

/// A request received by the stub billing platform.
#[derive(Debug, Clone)]
struct SeenRequest {
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: Value,
}

type Seen = Arc<Mutex<Vec<SeenRequest>>>;

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn stub_get_order(
    State(seen): State<Seen>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    seen.lock().unwrap().push(SeenRequest {
        path: format!("/v1/orders/{}", id),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body: Value::Null,
    });

    let status = match id.as_str() {
        "ord_1" | "ord_reject" => "paid",
        "ord_pending" => "pending",
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "errors": [{ "status": "404", "detail": "Order not found" }] })),
            )
        }
    };

    let order = json!({
        "data": { "type": "orders", "id": id, "attributes": { "status": status } }
    });
    (StatusCode::OK, Json(order))
}

async fn stub_create_refund(
    State(seen): State<Seen>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    seen.lock().unwrap().push(SeenRequest {
        path: "/v1/refunds".to_string(),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body: body.clone(),
    });

    if body["data"]["relationships"]["order"]["data"]["id"] == "ord_reject" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": [{ "detail": "The order has already been refunded" }] })),
        );
    }

    let amount = body["data"]["attributes"]["amount"].as_i64().unwrap_or(2999);
    (
        StatusCode::CREATED,
        Json(json!({
            "data": {
                "type": "refunds",
                "id": "ref_9",
                "attributes": { "amount": amount, "status": "refunded" }
            }
        })),
    )
}

/// Start the stub billing platform and return its base URL plus the request log.
async fn spawn_billing_stub() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Router::new()
        .route("/v1/orders/{id}", get(stub_get_order))
        .route("/v1/refunds", post(stub_create_refund))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, stub).await.unwrap();
    });

    (format!("http://{}/v1", addr), seen)
}

fn app_for(base_url: &str, api_key: Option<&str>) -> Router {
    let billing = Arc::new(LemonSqueezyClient::new(base_url));
    let refunds = RefundOrchestrator::new(billing, api_key.map(str::to_string));
    create_app(Arc::new(refunds))
}

async fn post_refund(app: Router, intent: Value) -> (StatusCode, Value) {
    post_raw(app, intent.to_string()).await
}

async fn post_raw(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/lemonsqueezy/refund")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn full_refund_end_to_end() {
    let (base_url, seen) = spawn_billing_stub().await;
    let app = app_for(&base_url, Some(API_KEY));

    let intent = json!({ "orderId": "ord_1", "reason": "duplicate" });
    let (status, body) = post_refund(app, intent).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Refund processed successfully",
            "refund": { "id": "ref_9", "amount": 2999, "status": "refunded" }
        })
    );

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].path, "/v1/orders/ord_1");
    assert_eq!(seen[1].path, "/v1/refunds");
    for request in &seen {
        assert_eq!(request.authorization.as_deref(), Some("Bearer sk_test_123"));
        assert_eq!(request.content_type.as_deref(), Some(JSON_API_MEDIA_TYPE));
    }
    assert_eq!(
        seen[1].body,
        json!({
            "data": {
                "type": "refunds",
                "attributes": { "reason": "duplicate" },
                "relationships": { "order": { "data": { "type": "orders", "id": "ord_1" } } }
            }
        })
    );
}

#[tokio::test]
async fn partial_refund_is_submitted_in_cents() {
    let (base_url, seen) = spawn_billing_stub().await;
    let app = app_for(&base_url, Some(API_KEY));

    let intent = json!({ "orderId": "ord_1", "amount": 19.99, "reason": "requested_by_customer" });
    let (status, body) = post_refund(app, intent).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refund"]["amount"], 1999);
    let sent = seen.lock().unwrap()[1].body.clone();
    assert_eq!(sent["data"]["attributes"]["amount"], 1999);
}

#[tokio::test]
async fn sub_cent_amount_is_rejected_locally() {
    let (base_url, seen) = spawn_billing_stub().await;
    let app = app_for(&base_url, Some(API_KEY));

    let intent = json!({ "orderId": "ord_1", "amount": 0.004, "reason": "duplicate" });
    let (status, body) = post_refund(app, intent).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Refund amount must be a positive number of at least 0.01"
    );
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_order_returns_not_found() {
    let (base_url, seen) = spawn_billing_stub().await;
    let app = app_for(&base_url, Some(API_KEY));

    let (status, body) = post_refund(app, json!({ "orderId": "bad_id", "reason": "x" })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Order not found: Order not found" })
    );
    assert_eq!(seen.lock().unwrap().len(), 1, "no refund should be submitted");
}

#[tokio::test]
async fn order_id_cannot_escape_its_path_segment() {
    for order_id in ["999/../ord_1", "ord_1?include=refunds", "../orders/ord_1"] {
        let (base_url, seen) = spawn_billing_stub().await;
        let app = app_for(&base_url, Some(API_KEY));

        let (status, body) = post_refund(app, json!({ "orderId": order_id, "reason": "x" })).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "order id {order_id}");
        assert_eq!(body["message"], "Order not found: Order not found");

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1, "no refund should be submitted for {order_id}");
        assert_eq!(seen[0].path, format!("/v1/orders/{}", order_id));
    }
}

#[tokio::test]
async fn pending_order_is_not_refundable() {
    let (base_url, seen) = spawn_billing_stub().await;
    let app = app_for(&base_url, Some(API_KEY));

    let intent = json!({ "orderId": "ord_pending", "reason": "duplicate" });
    let (status, body) = post_refund(app, intent).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Order must be in 'paid' status to be refunded"
    );
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_refund_keeps_upstream_status() {
    let (base_url, _seen) = spawn_billing_stub().await;
    let app = app_for(&base_url, Some(API_KEY));

    let intent = json!({ "orderId": "ord_reject", "reason": "duplicate" });
    let (status, body) = post_refund(app, intent).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Refund failed: The order has already been refunded"
    );
}

#[tokio::test]
async fn missing_fields_never_reach_the_billing_platform() {
    let (base_url, seen) = spawn_billing_stub().await;

    let (status, body) = post_refund(
        app_for(&base_url, Some(API_KEY)),
        json!({ "orderId": "ord_1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Order ID and reason are required" })
    );

    let (status, _) = post_refund(
        app_for(&base_url, Some(API_KEY)),
        json!({ "orderId": "", "reason": "duplicate" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn other_reason_requires_custom_text() {
    let (base_url, seen) = spawn_billing_stub().await;

    for intent in [
        json!({ "orderId": "ord_1", "reason": "other" }),
        json!({ "orderId": "ord_1", "reason": "other", "customReason": "   " }),
    ] {
        let (status, body) = post_refund(app_for(&base_url, Some(API_KEY)), intent).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Order ID and reason are required");
    }
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_body_uses_the_result_shape() {
    let (base_url, _seen) = spawn_billing_stub().await;
    let app = app_for(&base_url, Some(API_KEY));

    let (status, body) = post_raw(app, "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Invalid refund request body" })
    );
}

#[tokio::test]
async fn missing_api_key_is_reported_as_server_error() {
    let (base_url, seen) = spawn_billing_stub().await;
    let app = app_for(&base_url, None);

    let intent = json!({ "orderId": "ord_1", "reason": "duplicate" });
    let (status, body) = post_refund(app, intent).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Lemon Squeezy API key not configured");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_billing_platform_is_an_internal_error() {
    // Reserve a port, then release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = app_for(&format!("http://{}/v1", addr), Some(API_KEY));
    let intent = json!({ "orderId": "ord_1", "reason": "duplicate" });
    let (status, body) = post_refund(app, intent).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Internal server error" })
    );
}

#[tokio::test]
async fn refund_reasons_are_listed() {
    let app = app_for("http://127.0.0.1:1/v1", Some(API_KEY));
    let request = Request::builder()
        .uri("/api/refund/reasons")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let values: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["value"].as_str().unwrap())
        .collect();
    assert_eq!(
        values,
        ["duplicate", "fraudulent", "requested_by_customer", "other"]
    );
}

#[tokio::test]
async fn dashboard_reports_static_metrics() {
    let app = app_for("http://127.0.0.1:1/v1", None);
    let request = Request::builder()
        .uri("/api/dashboard")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"][0]["name"], "total_revenue");
    assert_eq!(body["metrics"][0]["value"], "$45,231.89");
    assert_eq!(body["recent_activity"].as_array().unwrap().len(), 3);
    assert_eq!(body["recent_activity"][1]["kind"], "refund");
    assert_eq!(body["recent_activity"][1]["amount"], -1999);
}
