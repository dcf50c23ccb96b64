//! Persistence for the session record.
//!
//! The `CredentialStore` keeps the authoritative copy in memory and writes
//! through to one of these backends on every change.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

use super::store::SessionData;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Keychain service name for the keyring backend
const SERVICE_NAME: &str = "storefront";

/// Keychain account holding the serialized session
const SESSION_ACCOUNT: &str = "session";

/// Storage for the single persisted session record.
pub trait SessionBackend: Send + Sync {
    /// Read the persisted record, if any.
    fn load(&self) -> Result<Option<SessionData>>;

    /// Replace the persisted record.
    fn store(&self, data: &SessionData) -> Result<()>;

    /// Delete the persisted record. Deleting a missing record is not an error.
    fn remove(&self) -> Result<()>;
}

/// JSON file in the cache directory.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            path: cache_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionBackend for FileBackend {
    fn load(&self) -> Result<Option<SessionData>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read session file")?;
        let data: SessionData = serde_json::from_str(&contents)
            .context("Failed to parse session file")?;
        Ok(Some(data))
    }

    fn store(&self, data: &SessionData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(data)?;

        // Write then rename so a reader never sees a half-written file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).context("Failed to write session file")?;
        std::fs::rename(&tmp, &self.path).context("Failed to replace session file")?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to delete session file")?;
        }
        Ok(())
    }
}

/// Session serialized as JSON in the OS keychain.
pub struct KeyringBackend {
    service: String,
}

impl KeyringBackend {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, SESSION_ACCOUNT).context("Failed to create keyring entry")
    }
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBackend for KeyringBackend {
    fn load(&self) -> Result<Option<SessionData>> {
        match self.entry()?.get_password() {
            Ok(contents) => {
                let data: SessionData = serde_json::from_str(&contents)
                    .context("Failed to parse session from keychain")?;
                Ok(Some(data))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read session from keychain"),
        }
    }

    fn store(&self, data: &SessionData) -> Result<()> {
        let contents = serde_json::to_string(data)?;
        self.entry()?
            .set_password(&contents)
            .context("Failed to store session in keychain")
    }

    fn remove(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }
}

/// Process-local storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<Option<SessionData>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionBackend for MemoryBackend {
    fn load(&self) -> Result<Option<SessionData>> {
        Ok(self.data.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn store(&self, data: &SessionData) -> Result<()> {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = Some(data.clone());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
