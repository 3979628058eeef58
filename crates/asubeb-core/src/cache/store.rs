use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::clock::{Clock, SystemClock};
use crate::api::ApiError;

/// Dashboard data is served from memory for 10 minutes after a successful fetch.
pub const CACHE_TTL_MINUTES: i64 = 10;

/// Snapshot of one cached remote payload plus its fetch status.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub data: Option<T>,
    /// Set only when `data` is populated by a successful fetch.
    pub timestamp: Option<DateTime<Utc>>,
    pub loading: bool,
    pub error: Option<ApiError>,
    pub has_attempted: bool,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            data: None,
            timestamp: None,
            loading: false,
            error: None,
            has_attempted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Loading,
    Populated,
    Errored,
}

/// In-memory store for a single payload. Owned by a coordinator for writes;
/// created per instance so tests never share state.
pub struct CacheStore<T> {
    entry: CacheEntry<T>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T> CacheStore<T> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entry: CacheEntry::default(),
            ttl: Duration::minutes(CACHE_TTL_MINUTES),
            clock,
        }
    }

    pub fn entry(&self) -> &CacheEntry<T> {
        &self.entry
    }

    pub fn data(&self) -> Option<&T> {
        self.entry.data.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.entry.error.as_ref()
    }

    /// Error text for display, if the last fetch failed.
    pub fn error_message(&self) -> Option<String> {
        self.entry.error.as_ref().map(ApiError::user_message)
    }

    pub fn is_loading(&self) -> bool {
        self.entry.loading
    }

    pub fn has_attempted(&self) -> bool {
        self.entry.has_attempted
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state(&self) -> CacheState {
        if self.entry.loading {
            CacheState::Loading
        } else if self.entry.error.is_some() {
            CacheState::Errored
        } else if self.entry.data.is_some() {
            CacheState::Populated
        } else {
            CacheState::Empty
        }
    }

    /// Age of the cached data, if any.
    pub fn age(&self) -> Option<Duration> {
        self.entry.timestamp.map(|t| self.clock.now() - t)
    }

    /// Data is present and younger than the TTL.
    pub fn is_cached(&self) -> bool {
        match (&self.entry.data, self.entry.timestamp) {
            (Some(_), Some(ts)) => self.clock.now() - ts < self.ttl,
            _ => false,
        }
    }

    pub fn should_fetch(&self) -> bool {
        if self.entry.loading {
            debug!("Dashboard fetch in flight");
            return false;
        }
        if self.is_cached() {
            return false;
        }
        if self.entry.has_attempted && self.entry.error.is_some() {
            debug!("Previous dashboard fetch failed, waiting for an explicit refresh");
            return false;
        }
        true
    }

    // ===== Transitions =====

    pub(crate) fn begin_loading(&mut self) {
        self.entry.loading = true;
        self.entry.error = None;
    }

    pub(crate) fn succeed(&mut self, data: T) {
        self.entry.data = Some(data);
        self.entry.timestamp = Some(self.clock.now());
        self.entry.loading = false;
        self.entry.error = None;
        self.entry.has_attempted = true;
    }

    pub(crate) fn fail(&mut self, error: ApiError) {
        self.entry.loading = false;
        self.entry.error = Some(error);
        self.entry.has_attempted = true;
    }

    /// Drop the loading flag without recording an outcome.
    pub(crate) fn abandon_loading(&mut self) {
        self.entry.loading = false;
    }

    pub(crate) fn clear(&mut self) {
        self.entry = CacheEntry::default();
    }
}

impl<T> Default for CacheStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn store() -> (CacheStore<Vec<u32>>, ManualClock) {
        let clock = ManualClock::default();
        (CacheStore::with_clock(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_empty_store() {
        let (store, _) = store();
        assert_eq!(store.state(), CacheState::Empty);
        assert!(!store.is_cached());
        assert!(store.should_fetch());
        assert_eq!(store.age(), None);
    }

    #[test]
    fn test_ttl_boundary() {
        let (mut store, clock) = store();
        store.begin_loading();
        store.succeed(vec![1]);
        assert!(store.is_cached());

        clock.advance(Duration::milliseconds(599_999));
        assert!(store.is_cached());

        clock.advance(Duration::milliseconds(1));
        assert!(!store.is_cached());
        assert!(store.should_fetch());
    }

    #[test]
    fn test_loading_blocks_fetch() {
        let (mut store, _) = store();
        store.begin_loading();
        assert_eq!(store.state(), CacheState::Loading);
        assert!(!store.should_fetch());
    }

    #[test]
    fn test_error_blocks_fetch_until_cleared() {
        let (mut store, _) = store();
        store.begin_loading();
        store.fail(ApiError::Network("connection refused".to_string()));
        assert_eq!(store.state(), CacheState::Errored);
        assert!(!store.should_fetch());
        assert_eq!(
            store.error_message().as_deref(),
            Some("API not available: connection refused")
        );

        store.clear();
        assert!(store.should_fetch());
    }

    #[test]
    fn test_failure_keeps_previous_data_and_timestamp() {
        let (mut store, clock) = store();
        store.begin_loading();
        store.succeed(vec![1, 2]);
        let stamped = store.entry().timestamp;

        clock.advance(Duration::minutes(3));
        store.begin_loading();
        store.fail(ApiError::application(None));
        assert_eq!(store.data(), Some(&vec![1, 2]));
        assert_eq!(store.entry().timestamp, stamped);
        assert_eq!(store.age(), Some(Duration::minutes(3)));
    }

    #[test]
    fn test_clear_resets_everything() {
        let (mut store, _) = store();
        store.begin_loading();
        store.succeed(vec![1]);
        store.clear();
        assert_eq!(store.entry(), &CacheEntry::default());
        assert!(!store.is_cached());
        assert!(!store.has_attempted());
    }
}
