//! Dashboard route.
//!
//! GET /api/dashboard - Headline metrics and recent activity
//!
//! The figures are fixed display values; there is no data pipeline behind them.

use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};

use crate::models::{ActivityEntry, ActivityKind, DashboardMetric, DashboardSummary};

/// Build the dashboard router.
pub fn router() -> Router {
    Router::new().route("/api/dashboard", get(get_dashboard))
}

async fn get_dashboard() -> Json<DashboardSummary> {
    Json(dashboard_summary(Utc::now()))
}

fn metric(name: &'static str, value: &str, change_percent: f64) -> DashboardMetric {
    DashboardMetric {
        name,
        value: value.to_string(),
        change_percent,
    }
}

/// Dashboard snapshot with activity times relative to `now`.
pub fn dashboard_summary(now: DateTime<Utc>) -> DashboardSummary {
    DashboardSummary {
        metrics: vec![
            metric("total_revenue", "$45,231.89", 20.1),
            metric("orders", "2350", 180.1),
            metric("customers", "12,234", 19.0),
            metric("refunds", "23", -2.0),
        ],
        recent_activity: vec![
            ActivityEntry {
                kind: ActivityKind::Order,
                reference: "12345",
                amount: 2999,
                occurred_at: now - Duration::hours(2),
            },
            ActivityEntry {
                kind: ActivityKind::Refund,
                reference: "67890",
                amount: -1999,
                occurred_at: now - Duration::hours(5),
            },
            ActivityEntry {
                kind: ActivityKind::Order,
                reference: "11111",
                amount: 4999,
                occurred_at: now - Duration::days(1),
            },
        ],
    }
}
