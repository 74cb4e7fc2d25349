//! Wire models for the refund desk.
//!
//! Two families live here: the JSON contract with the admin UI (camelCase,
//! mirroring the form fields) and the JSON:API documents exchanged with the
//! Lemon Squeezy REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request Models (Deserialize from JSON input)
// ============================================================================

/// A refund request submitted by the admin UI.
///
/// Missing `orderId`/`reason` fields deserialize as empty strings so they are
/// rejected by validation rather than by the JSON extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundIntent {
    #[serde(default)]
    pub order_id: String,
    /// Partial refund amount in major currency units. `None` refunds the full order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub reason: String,
    /// Free-text reason, used when `reason` is `"other"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_reason: Option<String>,
}

impl RefundIntent {
    /// The reason that will be sent upstream.
    ///
    /// Choosing `other` requires free text; without it the reason is empty.
    pub fn effective_reason(&self) -> &str {
        let reason = self.reason.trim();
        if reason != OTHER_REASON {
            return reason;
        }
        self.custom_reason.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Preset reason value that defers to `customReason`.
pub const OTHER_REASON: &str = "other";

// ============================================================================
// Response Models
// ============================================================================

/// Result returned to the admin UI for every refund attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund: Option<RefundSummary>,
}

impl RefundResult {
    pub fn succeeded(message: impl Into<String>, refund: RefundSummary) -> Self {
        Self {
            success: true,
            message: message.into(),
            refund: Some(refund),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            refund: None,
        }
    }
}

/// The refund as recorded by the billing platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundSummary {
    pub id: String,
    /// Refunded amount in minor currency units (cents).
    pub amount: i64,
    pub status: String,
}

/// A preset refund reason offered by the refund form.
#[derive(Debug, Clone, Serialize)]
pub struct RefundReasonOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Static dashboard snapshot.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub metrics: Vec<DashboardMetric>,
    pub recent_activity: Vec<ActivityEntry>,
}

/// One headline figure on the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardMetric {
    pub name: &'static str,
    pub value: String,
    /// Change relative to the previous month, in percent.
    pub change_percent: f64,
}

/// Kind of a recent activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Order,
    Refund,
}

/// A recent order or refund shown on the dashboard.
#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub reference: &'static str,
    /// Signed amount in cents; refunds are negative.
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}

// ============================================================================
// Billing Platform Documents (JSON:API)
// ============================================================================

/// JSON:API resource type for orders.
pub const ORDERS_TYPE: &str = "orders";

/// JSON:API resource type for refunds.
pub const REFUNDS_TYPE: &str = "refunds";

/// Response body of `GET /orders/{id}`.
#[derive(Debug, Deserialize)]
pub struct OrderDocument {
    pub data: OrderResource,
}

#[derive(Debug, Deserialize)]
pub struct OrderResource {
    pub id: String,
    pub attributes: OrderAttributes,
}

#[derive(Debug, Deserialize)]
pub struct OrderAttributes {
    pub status: String,
}

/// Request body of `POST /refunds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRequestDocument {
    pub data: RefundRequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRequestData {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: RefundRequestAttributes,
    pub relationships: RefundRelationships,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRequestAttributes {
    pub reason: String,
    /// Minor units. Omitted entirely for a full refund.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRelationships {
    pub order: Relationship,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub data: ResourceIdentifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl RefundRequestDocument {
    /// Build a refund request against `order_id`.
    pub fn new(order_id: &str, reason: &str, amount_cents: Option<i64>) -> Self {
        Self {
            data: RefundRequestData {
                kind: REFUNDS_TYPE.to_string(),
                attributes: RefundRequestAttributes {
                    reason: reason.to_string(),
                    amount: amount_cents,
                },
                relationships: RefundRelationships {
                    order: Relationship {
                        data: ResourceIdentifier {
                            kind: ORDERS_TYPE.to_string(),
                            id: order_id.to_string(),
                        },
                    },
                },
            },
        }
    }

    pub fn order_id(&self) -> &str {
        &self.data.relationships.order.data.id
    }
}

/// Response body of a successful `POST /refunds`.
#[derive(Debug, Deserialize)]
pub struct RefundDocument {
    pub data: RefundResource,
}

#[derive(Debug, Deserialize)]
pub struct RefundResource {
    pub id: String,
    pub attributes: RefundAttributes,
}

#[derive(Debug, Deserialize)]
pub struct RefundAttributes {
    pub amount: i64,
    pub status: String,
}

impl From<RefundDocument> for RefundSummary {
    fn from(doc: RefundDocument) -> Self {
        Self {
            id: doc.data.id,
            amount: doc.data.attributes.amount,
            status: doc.data.attributes.status,
        }
    }
}

/// JSON:API error body.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorDocument {
    /// Detail of the first error, if the body carries one.
    pub fn first_detail(body: &serde_json::Value) -> Option<String> {
        let doc: ErrorDocument = serde_json::from_value(body.clone()).ok()?;
        doc.errors
            .into_iter()
            .next()
            .and_then(|e| e.detail)
            .filter(|d| !d.is_empty())
    }
}
