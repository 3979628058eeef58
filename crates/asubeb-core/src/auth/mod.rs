//! Local PIN gating for the dashboard.
//!
//! This module provides:
//! - `PinGate`: verifies the dashboard PIN against an Argon2 hash
//! - `PinSession`: the unlocked session, persisted to disk
//!
//! Sessions lapse after 30 minutes without activity. Nothing here is sent
//! to the backend.

pub mod pin;
pub mod session;

pub use pin::{generate_token, PinGate};
pub use session::{PinSession, SessionData, SESSION_IDLE_MINUTES};
