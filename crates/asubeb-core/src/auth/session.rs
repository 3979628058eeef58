use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Session file name in cache directory
const SESSION_FILE: &str = "pin_session.json";

/// A PIN session lapses after 30 minutes without activity.
pub const SESSION_IDLE_MINUTES: i64 = 30;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Persisted as `{ token, timestamp, lastAccessed }` with epoch-millisecond times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub token: String,
    /// When the PIN was entered.
    pub timestamp: i64,
    pub last_accessed: i64,
}

impl SessionData {
    pub fn new(token: String, now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis();
        Self {
            token,
            timestamp: millis,
            last_accessed: millis,
        }
    }

    fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        Self::millis_to_datetime(self.timestamp)
    }

    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        Self::millis_to_datetime(self.last_accessed)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.last_accessed_at() >= Duration::minutes(SESSION_IDLE_MINUTES)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Get minutes remaining until expiry (for display), counting a partial minute as whole
    pub fn minutes_until_expiry_at(&self, now: DateTime<Utc>) -> i64 {
        let expiry = self.last_accessed_at() + Duration::minutes(SESSION_IDLE_MINUTES);
        let remaining_ms = (expiry - now).num_milliseconds();
        if remaining_ms <= 0 {
            0
        } else {
            (remaining_ms + MILLIS_PER_MINUTE - 1) / MILLIS_PER_MINUTE
        }
    }
}

/// Local PIN session, persisted to disk. Never sent to the backend.
pub struct PinSession {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl PinSession {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Expired sessions are deleted.
    pub fn load(&mut self) -> Result<bool> {
        self.load_at(Utc::now())
    }

    pub fn load_at(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }

        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;

        if data.is_expired_at(now) {
            debug!("PIN session expired, removing");
            self.clear()?;
            return Ok(false);
        }

        self.data = Some(data);
        Ok(true)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Start a new session with the given token and persist it.
    pub fn start(&mut self, token: String, now: DateTime<Utc>) -> Result<()> {
        self.data = Some(SessionData::new(token, now));
        self.save()
    }

    /// Record activity, sliding the expiry window. Returns false if the
    /// session had already lapsed.
    pub fn touch(&mut self, now: DateTime<Utc>) -> Result<bool> {
        match self.data {
            Some(ref mut data) if !data.is_expired_at(now) => {
                data.last_accessed = now.timestamp_millis();
            }
            Some(_) => {
                self.clear()?;
                return Ok(false);
            }
            None => return Ok(false),
        }
        self.save()?;
        Ok(true)
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.data.as_ref().map(|d| !d.is_expired_at(now)).unwrap_or(false)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}
