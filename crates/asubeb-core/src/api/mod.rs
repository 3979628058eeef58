//! REST API client module for the ASUBEB dashboard backend.
//!
//! This module provides the `ApiClient` for issuing JSON requests against
//! the versioned base URL, the `DashboardTransport` seam the dashboard
//! coordinator fetches through, and the `ApiError` taxonomy.

pub mod client;
pub mod error;

pub use client::{ApiClient, DashboardTransport, Envelope};
pub use error::ApiError;
