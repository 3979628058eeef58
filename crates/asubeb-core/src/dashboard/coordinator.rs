//! Fetch coordination for the admin dashboard.
//!
//! `DashboardCoordinator` decides whether a fetch is needed, keeps at most one
//! request in flight, and records every outcome in its `CacheStore`. Errors
//! never escape: callers read them back from the store.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{AbortHandle, Abortable};
use tracing::{debug, info, warn};

use crate::api::{ApiError, DashboardTransport};
use crate::cache::{CacheEntry, CacheState, CacheStore, Clock, SystemClock};
use crate::models::{DashboardParams, DashboardPayload, DerivedStudentsPayload};

use super::students;

/// Which rule decided the result of a `fetch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fresh cached data answered the request.
    Served,
    /// Another request was already in flight.
    Deduplicated,
    /// The last attempt failed and no refresh was forced.
    Suppressed,
    /// A network call completed and populated the cache.
    Fetched,
    /// A network call completed with an error, now held by the store.
    Failed(ApiError),
    /// The request was aborted by `clear` or `cancel` before it was applied.
    Cancelled,
}

impl FetchOutcome {
    /// True when this call went to the network.
    pub fn hit_network(&self) -> bool {
        matches!(
            self,
            FetchOutcome::Fetched | FetchOutcome::Failed(_) | FetchOutcome::Cancelled
        )
    }
}

struct Inner {
    store: CacheStore<DashboardPayload>,
    /// Bumped whenever an outstanding request is invalidated.
    generation: u64,
    in_flight: Option<AbortHandle>,
}

/// Releases the loading state if the `fetch` future is dropped mid-request.
struct InFlightGuard<'a> {
    inner: &'a Mutex<Inner>,
    generation: u64,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.generation == self.generation {
            inner.generation += 1;
            inner.in_flight = None;
            inner.store.abandon_loading();
            debug!(generation = self.generation, "Admin dashboard request dropped before completion");
        }
    }
}

pub struct DashboardCoordinator<T> {
    transport: T,
    inner: Mutex<Inner>,
}

impl<T: DashboardTransport> DashboardCoordinator<T> {
    pub fn new(transport: T) -> Self {
        Self::with_clock(transport, Arc::new(SystemClock))
    }

    pub fn with_clock(transport: T, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            inner: Mutex::new(Inner {
                store: CacheStore::with_clock(clock),
                generation: 0,
                in_flight: None,
            }),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fetch the admin dashboard unless the cache, an in-flight request, or a
    /// previous failure makes the call unnecessary. `force_refresh` skips the
    /// cache and failure checks but never starts a second concurrent request.
    pub async fn fetch(&self, params: &DashboardParams, force_refresh: bool) -> FetchOutcome {
        let (generation, registration) = {
            let mut inner = self.lock();

            if !force_refresh && params.is_empty() && inner.store.is_cached() {
                debug!("Serving admin dashboard from cache");
                return FetchOutcome::Served;
            }
            if inner.store.is_loading() {
                debug!("Admin dashboard request already in flight");
                return FetchOutcome::Deduplicated;
            }
            if !force_refresh && inner.store.has_attempted() && inner.store.error().is_some() {
                debug!("Skipping admin dashboard fetch after a failure");
                return FetchOutcome::Suppressed;
            }

            let (handle, registration) = AbortHandle::new_pair();
            inner.generation += 1;
            inner.in_flight = Some(handle);
            inner.store.begin_loading();
            info!(generation = inner.generation, force_refresh, "Fetching admin dashboard");
            (inner.generation, registration)
        };

        let mut guard = InFlightGuard {
            inner: &self.inner,
            generation,
            armed: true,
        };
        let result = Abortable::new(self.transport.fetch_admin_dashboard(params), registration).await;
        guard.disarm();

        let mut inner = self.lock();
        if inner.generation != generation {
            warn!(generation, "Discarding admin dashboard response for a cancelled request");
            return FetchOutcome::Cancelled;
        }
        inner.in_flight = None;

        match result {
            Ok(Ok(raw)) => {
                inner.store.succeed(DashboardPayload::normalize(&raw));
                info!("Admin dashboard cached");
                FetchOutcome::Fetched
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Admin dashboard fetch failed");
                inner.store.fail(e.clone());
                FetchOutcome::Failed(e)
            }
            Err(_aborted) => {
                inner.store.abandon_loading();
                FetchOutcome::Cancelled
            }
        }
    }

    /// Reset the cache to empty and abort any in-flight request so its
    /// response can't repopulate the store.
    pub fn clear(&self) {
        let mut inner = self.lock();
        Self::abort_in_flight(&mut inner);
        inner.store.clear();
        info!("Admin dashboard cache cleared");
    }

    /// Abort the in-flight request, if any, keeping whatever is cached.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        if Self::abort_in_flight(&mut inner) {
            inner.store.abandon_loading();
            debug!("Admin dashboard request cancelled");
        }
    }

    fn abort_in_flight(inner: &mut Inner) -> bool {
        inner.generation += 1;
        match inner.in_flight.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    // ===== Reads =====

    pub fn is_cached(&self) -> bool {
        self.lock().store.is_cached()
    }

    pub fn should_fetch(&self) -> bool {
        self.lock().store.should_fetch()
    }

    pub fn state(&self) -> CacheState {
        self.lock().store.state()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().store.is_loading()
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().store.error_message()
    }

    /// Copy of the current cache entry.
    pub fn snapshot(&self) -> CacheEntry<DashboardPayload> {
        self.lock().store.entry().clone()
    }

    /// Minutes since the cached data was fetched.
    pub fn age_minutes(&self) -> Option<i64> {
        self.lock().store.age().map(|a| a.num_minutes())
    }

    pub fn derive_students_view(&self) -> Option<DerivedStudentsPayload> {
        students::derive_students_view(&self.lock().store)
    }

    pub fn has_usable_data(&self) -> bool {
        students::has_usable_data(&self.lock().store)
    }
}
