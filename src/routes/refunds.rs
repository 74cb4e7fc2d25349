//! Refund routes.
//!
//! POST /api/lemonsqueezy/refund - Validate and submit a refund to Lemon Squeezy
//! GET  /api/refund/reasons      - Preset refund reasons offered by the form

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use tracing::warn;

use crate::models::{RefundIntent, RefundReasonOption, RefundResult, OTHER_REASON};
use crate::refund::RefundOrchestrator;

/// Reasons the refund form offers. `other` defers to the free-text `customReason`.
pub const REFUND_REASONS: [RefundReasonOption; 4] = [
    reason("duplicate", "Duplicate charge"),
    reason("fraudulent", "Fraudulent"),
    reason("requested_by_customer", "Requested by customer"),
    reason(OTHER_REASON, "Other"),
];

const fn reason(value: &'static str, label: &'static str) -> RefundReasonOption {
    RefundReasonOption { value, label }
}

/// Build the refunds router.
pub fn router() -> Router {
    Router::new()
        .route("/api/lemonsqueezy/refund", post(create_refund))
        .route("/api/refund/reasons", get(list_reasons))
}

/// Run a refund through the orchestrator and report its outcome.
///
/// Every outcome, including a body that fails to parse, is returned in the
/// `RefundResult` shape.
async fn create_refund(
    Extension(refunds): Extension<Arc<RefundOrchestrator>>,
    payload: Result<Json<RefundIntent>, JsonRejection>,
) -> (StatusCode, Json<RefundResult>) {
    let intent = match payload {
        Ok(Json(intent)) => intent,
        Err(rejection) => {
            warn!("Rejected refund request body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(RefundResult::failed("Invalid refund request body")),
            );
        }
    };

    let outcome = refunds.process_refund(&intent).await;
    (outcome.status, Json(outcome.result))
}

/// List the preset refund reasons.
async fn list_reasons() -> Json<Vec<RefundReasonOption>> {
    Json(REFUND_REASONS.to_vec())
}
