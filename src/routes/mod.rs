//! HTTP route modules for the refund desk.
//!
//! - `refunds`: refund submission and the preset reason list
//! - `dashboard`: static dashboard metrics and recent activity

pub mod dashboard;
pub mod refunds;
