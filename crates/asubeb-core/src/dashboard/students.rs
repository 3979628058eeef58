//! The students page view over the cached admin dashboard.

use tracing::debug;

use crate::api::DashboardTransport;
use crate::cache::CacheStore;
use crate::models::{DashboardParams, DashboardPayload, DerivedStudentsPayload};

use super::DashboardCoordinator;

/// Build the students view from whatever the store holds right now.
/// Pure: same snapshot, same result.
pub fn derive_students_view(store: &CacheStore<DashboardPayload>) -> Option<DerivedStudentsPayload> {
    store.data().map(DerivedStudentsPayload::from_dashboard)
}

/// Cached dashboard data exists and is still fresh.
pub fn has_usable_data(store: &CacheStore<DashboardPayload>) -> bool {
    store.data().is_some() && store.is_cached()
}

/// Students view for the students page: straight from the cache when it's
/// fresh, otherwise after a coordinator fetch. `None` when no data could be
/// obtained; the coordinator's error explains why.
pub async fn students_view<T: DashboardTransport>(
    coordinator: &DashboardCoordinator<T>,
    params: &DashboardParams,
    force_refresh: bool,
) -> Option<DerivedStudentsPayload> {
    if !force_refresh && coordinator.has_usable_data() {
        debug!("Deriving students view from cached dashboard");
        return coordinator.derive_students_view();
    }
    let outcome = coordinator.fetch(params, force_refresh).await;
    debug!(?outcome, "Dashboard fetch for students view");
    coordinator.derive_students_view()
}
