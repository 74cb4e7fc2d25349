//! # Refund Orchestration
//!
//! Validates a [`RefundIntent`], checks the order with the billing platform
//! and submits the refund. The pipeline is strictly sequential:
//!
//! 1. **validate**: order ID and reason present, amount at least one cent if given
//! 2. **configuration**: billing credential available
//! 3. **lookup**: `GET /orders/{id}` must succeed and return that same order
//! 4. **eligibility**: order status must be `paid`
//! 5. **submit**: `POST /refunds`, amount converted to cents
//!
//! Every failure becomes a [`RefundResult`] with `success = false`; nothing
//! escapes [`RefundOrchestrator::process_refund`].

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{debug, error, info, warn};

use crate::billing::{BillingApi, BillingError};
use crate::models::{
    ErrorDocument, OrderDocument, RefundDocument, RefundIntent, RefundRequestDocument,
    RefundResult, RefundSummary,
};

/// Order status that permits a refund.
pub const REFUNDABLE_STATUS: &str = "paid";

pub const SUCCESS_MESSAGE: &str = "Refund processed successfully";

/// Everything that can stop a refund.
#[derive(Debug, thiserror::Error)]
pub enum RefundError {
    #[error("Order ID and reason are required")]
    MissingFields,

    #[error("Refund amount must be a positive number of at least 0.01")]
    InvalidAmount,

    #[error("Refund amount is too large")]
    AmountTooLarge,

    #[error("Lemon Squeezy API key not configured")]
    NotConfigured,

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order must be in 'paid' status to be refunded")]
    NotRefundable,

    #[error("Refund failed: {detail}")]
    Rejected { status: u16, detail: String },

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error("malformed billing platform response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

impl RefundError {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RefundError::MissingFields
            | RefundError::InvalidAmount
            | RefundError::AmountTooLarge
            | RefundError::NotRefundable => StatusCode::BAD_REQUEST,
            RefundError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            RefundError::Rejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RefundError::NotConfigured
            | RefundError::Billing(_)
            | RefundError::MalformedResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            RefundError::Billing(_) | RefundError::MalformedResponse(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            RefundError::NotConfigured | RefundError::Billing(_) | RefundError::MalformedResponse(_)
        )
    }
}

/// Result of one orchestration together with the HTTP status to report.
#[derive(Debug, Clone, PartialEq)]
pub struct RefundOutcome {
    pub status: StatusCode,
    pub result: RefundResult,
}

/// Largest cent value that survives a round trip through an f64.
pub const MAX_MINOR_UNITS: i64 = 9_007_199_254_740_991;

/// Convert a major-unit amount to cents, rounding half away from zero.
///
/// The rounded value must be at least one cent and no more than
/// [`MAX_MINOR_UNITS`].
pub fn to_minor_units(amount: f64) -> Result<i64, RefundError> {
    let cents = (amount * 100.0).round();
    if !cents.is_finite() || cents < 1.0 {
        return Err(RefundError::InvalidAmount);
    }
    if cents > MAX_MINOR_UNITS as f64 {
        return Err(RefundError::AmountTooLarge);
    }
    Ok(cents as i64)
}

/// Stateless refund pipeline over a [`BillingApi`].
pub struct RefundOrchestrator {
    billing: Arc<dyn BillingApi>,
    api_key: Option<String>,
}

impl RefundOrchestrator {
    pub fn new(billing: Arc<dyn BillingApi>, api_key: Option<String>) -> Self {
        Self { billing, api_key }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run the full pipeline. Never fails; errors are folded into the outcome.
    pub async fn process_refund(&self, intent: &RefundIntent) -> RefundOutcome {
        let order_id = intent.order_id.trim();
        info!("Refund requested for order {}", order_id);

        match self.try_refund(intent).await {
            Ok(refund) => {
                info!(
                    "Refund {} created for order {}: {} cents, status {}",
                    refund.id, order_id, refund.amount, refund.status
                );
                RefundOutcome {
                    status: StatusCode::OK,
                    result: RefundResult::succeeded(SUCCESS_MESSAGE, refund),
                }
            }
            Err(e) => {
                if e.is_internal() {
                    error!("Refund for order {} failed: {}", order_id, e);
                } else {
                    warn!("Refund for order {} rejected: {}", order_id, e);
                }
                RefundOutcome {
                    status: e.status_code(),
                    result: RefundResult::failed(e.public_message()),
                }
            }
        }
    }

    async fn try_refund(&self, intent: &RefundIntent) -> Result<RefundSummary, RefundError> {
        let order_id = intent.order_id.trim();
        let reason = intent.effective_reason();
        if order_id.is_empty() || reason.is_empty() {
            return Err(RefundError::MissingFields);
        }

        let amount_cents = intent.amount.map(to_minor_units).transpose()?;

        let api_key = self.api_key.as_deref().ok_or(RefundError::NotConfigured)?;

        let lookup = self.billing.get_order(api_key, order_id).await?;
        if !lookup.is_success() {
            let detail = ErrorDocument::first_detail(&lookup.body)
                .unwrap_or_else(|| "Invalid order ID".to_string());
            return Err(RefundError::OrderNotFound(detail));
        }

        let order: OrderDocument = serde_json::from_value(lookup.body)?;
        debug!(
            "Order {} has status {}",
            order.data.id, order.data.attributes.status
        );
        if order.data.id != order_id {
            warn!(
                "Lookup for order {} returned order {}",
                order_id, order.data.id
            );
            return Err(RefundError::OrderNotFound("Invalid order ID".to_string()));
        }
        if order.data.attributes.status != REFUNDABLE_STATUS {
            return Err(RefundError::NotRefundable);
        }

        let request = RefundRequestDocument::new(order_id, reason, amount_cents);
        let created = self.billing.create_refund(api_key, &request).await?;
        if !created.is_success() {
            let detail = ErrorDocument::first_detail(&created.body)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(RefundError::Rejected {
                status: created.status,
                detail,
            });
        }

        let refund: RefundDocument = serde_json::from_value(created.body)?;
        Ok(refund.into())
    }
}
