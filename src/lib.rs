//! # Refund Desk Library
//!
//! Exposes the Axum router and modules so integration tests can create
//! an in-process server without requiring `cargo run` in another terminal.

pub mod billing;
pub mod config;
pub mod models;
pub mod refund;
pub mod routes;

use std::sync::Arc;

use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::refund::RefundOrchestrator;

/// Build the Axum router with all route modules and middleware.
///
/// The caller supplies a ready orchestrator (and with it the billing client
/// and credential). This function does NOT bind a listener.
pub fn create_app(refunds: Arc<RefundOrchestrator>) -> Router {
    Router::new()
        .merge(routes::refunds::router())
        .merge(routes::dashboard::router())
        .layer(Extension(refunds))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
