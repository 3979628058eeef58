//! Core library for the ASUBEB school performance dashboard.
//!
//! Fetches the admin dashboard from the REST backend, keeps it in a
//! 10-minute in-memory cache behind a request coordinator, and derives the
//! students page view from it without a second round-trip. Access is gated
//! by a local PIN session.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, DashboardTransport};
pub use cache::{CacheEntry, CacheState, CacheStore};
pub use config::{ApiSettings, Config};
pub use dashboard::{DashboardCoordinator, FetchOutcome};
pub use models::{DashboardParams, DashboardPayload, DerivedStudentsPayload, PerformanceRecord};
