//! In-memory caching of dashboard payloads.
//!
//! This module provides the `CacheStore` holding one remote payload with its
//! fetch status. Data is considered fresh for 10 minutes; nothing is written
//! to disk.

pub mod clock;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CacheEntry, CacheState, CacheStore, CACHE_TTL_MINUTES};
