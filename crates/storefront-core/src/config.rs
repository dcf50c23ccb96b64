//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! backend URLs, the currency service key, session lifetime, and the last
//! used login email.
//!
//! Configuration is stored at `~/.config/storefront/config.json`. The URLs and
//! the currency key can be overridden from the environment (or a `.env` file
//! loaded by the binary):
//!
//! - `STOREFRONT_API_URL`
//! - `STOREFRONT_CURRENCY_URL`
//! - `STOREFRONT_CURRENCY_KEY`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{DEFAULT_API_BASE_URL, DEFAULT_CURRENCY_BASE_URL};
use crate::api::client::REQUEST_TIMEOUT_SECS;
use crate::auth::{
    CredentialStore, FileBackend, KeyringBackend, MemoryBackend, SystemClock,
    DEFAULT_VALIDITY_MINUTES,
};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "storefront";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_API_URL: &str = "STOREFRONT_API_URL";
const ENV_CURRENCY_URL: &str = "STOREFRONT_CURRENCY_URL";
const ENV_CURRENCY_KEY: &str = "STOREFRONT_CURRENCY_KEY";

/// Where the session record is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackendKind {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub currency_base_url: String,
    pub currency_access_key: Option<String>,
    pub session_validity_minutes: i64,
    pub request_timeout_secs: u64,
    pub session_backend: SessionBackendKind,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            currency_base_url: DEFAULT_CURRENCY_BASE_URL.to_string(),
            currency_access_key: None,
            session_validity_minutes: DEFAULT_VALIDITY_MINUTES,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            session_backend: SessionBackendKind::default(),
            last_email: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
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

    /// Record the last login email on disk without writing any
    /// environment overrides into the file.
    pub fn remember_email(&mut self, email: &str) -> Result<()> {
        self.last_email = Some(email.to_string());
        let path = Self::config_path()?;
        let mut stored = Self::load_from(&path)?;
        stored.last_email = Some(email.to_string());
        stored.save_to(&path)
    }

    /// Override fields from `lookup` (normally the process environment).
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            debug!(url = %url, "API URL overridden from environment");
            self.api_base_url = url;
        }
        if let Some(url) = get(ENV_CURRENCY_URL) {
            self.currency_base_url = url;
        }
        if let Some(key) = get(ENV_CURRENCY_KEY) {
            self.currency_access_key = Some(key);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Session validity window. Non-positive or unrepresentable values fall
    /// back to the default.
    pub fn validity(&self) -> Duration {
        Some(self.session_validity_minutes)
            .filter(|minutes| *minutes > 0)
            .and_then(Duration::try_minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_VALIDITY_MINUTES))
    }

    /// Open the credential store on the configured backend.
    pub fn open_store(&self) -> Result<CredentialStore> {
        let clock = Arc::new(SystemClock);
        let store = match self.session_backend {
            SessionBackendKind::File => {
                CredentialStore::open(FileBackend::new(self.cache_dir()?), clock, self.validity())
            }
            SessionBackendKind::Keyring => {
                CredentialStore::open(KeyringBackend::new(), clock, self.validity())
            }
            SessionBackendKind::Memory => {
                CredentialStore::open(MemoryBackend::new(), clock, self.validity())
            }
        };
        Ok(store)
    }
}
