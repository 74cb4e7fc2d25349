//! # Refund Desk
//!
//! Internal admin service for issuing refunds against Lemon Squeezy orders.
//!
//! ## Endpoints
//!
//! 1. **POST /api/lemonsqueezy/refund**: validate, look up the order, submit the refund
//! 2. **GET /api/refund/reasons**: preset refund reasons for the form
//! 3. **GET /api/dashboard**: static dashboard metrics
//!
//! ## Architecture
//!
//! - Axum handles HTTP routing and request/response lifecycle
//! - Reqwest talks to the Lemon Squeezy REST API
//! - Nothing is stored locally; the billing platform owns order and refund state

use std::sync::Arc;

use tracing::{info, warn};

use refund_desk::billing::LemonSqueezyClient;
use refund_desk::config::AppConfig;
use refund_desk::create_app;
use refund_desk::refund::RefundOrchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refund_desk=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting refund desk");

    let config = AppConfig::from_env();
    info!("Loaded configuration: {:?}", config);

    let billing = Arc::new(LemonSqueezyClient::new(config.billing_api_url.clone()));
    let refunds = Arc::new(RefundOrchestrator::new(billing, config.api_key.clone()));
    if !refunds.is_configured() {
        warn!("LEMONSQUEEZY_API_KEY is not set; refund requests will fail until it is configured");
    }

    let app = create_app(refunds);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
