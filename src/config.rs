//! Process configuration for the refund desk.
//!
//! Values come from the environment (optionally seeded from a `.env` file by
//! `main`). The billing credential is resolved once here and handed to the
//! orchestrator, so nothing below this module reads the environment.

use std::fmt;

/// Default Lemon Squeezy REST endpoint.
pub const DEFAULT_BILLING_API_URL: &str = "https://api.lemonsqueezy.com/v1";

/// Default listen address for the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Runtime configuration for the service.
#[derive(Clone)]
pub struct AppConfig {
    /// Bearer credential for the billing platform. `None` when unset or blank.
    pub api_key: Option<String>,
    /// Billing platform base URL, without a trailing slash.
    pub billing_api_url: String,
    pub bind_addr: String,
}

impl AppConfig {
    /// Build the configuration from `LEMONSQUEEZY_API_KEY`, `LEMONSQUEEZY_API_URL`
    /// and `BIND_ADDR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("LEMONSQUEEZY_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let billing_api_url = lookup("LEMONSQUEEZY_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BILLING_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Self {
            api_key,
            billing_api_url,
            bind_addr,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("billing_api_url", &self.billing_api_url)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
