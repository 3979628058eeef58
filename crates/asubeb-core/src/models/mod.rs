//! Data models for the ASUBEB dashboard.
//!
//! - `DashboardPayload`: the admin dashboard after normalization
//! - `DashboardParams`: filter/sort/pagination for the dashboard request
//! - `DerivedStudentsPayload`, `PerformanceRecord`: the students page view

pub mod dashboard;
pub mod params;
pub mod students;

pub use dashboard::{DashboardPayload, DashboardSummary, Pagination, Reference, StudentPage, StudentScore};
pub use params::{DashboardParams, SortOrder};
pub use students::{DerivedStudentsPayload, PerformanceRecord, GRADED_SUBJECT_COUNT};
