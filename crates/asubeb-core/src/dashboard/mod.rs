//! Admin dashboard data layer.
//!
//! - `DashboardCoordinator`: cache-first fetching with de-duplication,
//!   failure suppression and cancellation
//! - `students`: the students page view derived from the cached dashboard

pub mod coordinator;
pub mod students;

pub use coordinator::{DashboardCoordinator, FetchOutcome};
pub use students::{derive_students_view, has_usable_data, students_view};
