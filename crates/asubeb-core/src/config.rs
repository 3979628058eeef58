//! Application configuration management.
//!
//! Configuration is stored at `~/.config/asubeb/config.json` and holds the
//! API host, API version and the PIN hash. `ASUBEB_API_URL` and
//! `ASUBEB_API_VERSION` override the file; with neither set the client
//! talks to a local backend.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "asubeb";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const API_URL_ENV: &str = "ASUBEB_API_URL";
pub const API_VERSION_ENV: &str = "ASUBEB_API_VERSION";

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_API_VERSION: &str = "v1";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub api_version: Option<String>,
    /// Argon2 PHC string for the dashboard PIN.
    pub pin_hash: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the PIN session file.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

/// Resolved API host and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub host: String,
    pub version: String,
}

impl ApiSettings {
    pub fn new(host: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            version: version.into(),
        }
    }

    /// Environment first, then the config file, then the localhost default.
    pub fn resolve(config: &Config) -> Self {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    fn resolve_with(config: &Config, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |v: String| {
            let v = v.trim().to_string();
            (!v.is_empty()).then_some(v)
        };
        let pick = |key: &str, file: &Option<String>, default: &str| {
            env(key)
                .and_then(non_blank)
                .or_else(|| file.clone().and_then(non_blank))
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            host: pick(API_URL_ENV, &config.api_base_url, DEFAULT_API_URL),
            version: pick(API_VERSION_ENV, &config.api_version, DEFAULT_API_VERSION),
        }
    }

    /// `{host}/api/{version}` with stray slashes removed.
    pub fn base_url(&self) -> String {
        format!(
            "{}/api/{}",
            self.host.trim_end_matches('/'),
            self.version.trim_matches('/')
        )
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_API_VERSION)
    }
}
