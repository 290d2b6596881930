//! Durable backends for the session store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;
use thiserror::Error;

use super::SessionData;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Keychain service name
const SERVICE_NAME: &str = "taskpulse";

/// Why a stored session could not be read.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The record exists but cannot be decoded; it will never load
    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),

    /// The backend could not be reached right now (I/O error, locked keychain)
    #[error("Session storage unavailable: {0:#}")]
    Unavailable(anyhow::Error),
}

/// Where a session lives between process runs.
pub trait SessionStorage: Send + Sync {
    /// Read the stored session, `None` if nothing is stored
    fn load(&self) -> Result<Option<SessionData>, LoadError>;

    fn save(&self, data: &SessionData) -> Result<()>;

    /// Remove the stored session. Removing nothing is not an error.
    fn clear(&self) -> Result<()>;
}

/// JSON file in the cache directory.
pub struct FileStorage {
    cache_dir: PathBuf,
}

impl FileStorage {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<SessionData>, LoadError> {
        let contents = match std::fs::read_to_string(self.path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LoadError::Unavailable(
                    anyhow::Error::new(e).context("Failed to read session file"),
                ))
            }
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| LoadError::Corrupt(format!("session file: {}", e)))
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove session file"),
    }
}

/// Session serialized into the OS keychain, one entry per server.
pub struct KeyringStorage {
    account: String,
}

impl KeyringStorage {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account).context("Failed to create keyring entry")
    }
}

impl SessionStorage for KeyringStorage {
    fn load(&self) -> Result<Option<SessionData>, LoadError> {
        let entry = self.entry().map_err(LoadError::Unavailable)?;
        match entry.get_password() {
            Ok(secret) => serde_json::from_str(&secret)
                .map(Some)
                .map_err(|e| LoadError::Corrupt(format!("keychain entry: {}", e))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(keyring::Error::BadEncoding(_)) => {
                Err(LoadError::Corrupt("keychain entry is not valid UTF-8".to_string()))
            }
            Err(e) => Err(LoadError::Unavailable(
                anyhow::Error::new(e).context("Failed to read session from keychain"),
            )),
        }
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        let secret = serde_json::to_string(data)?;
        self.entry()?
            .set_password(&secret)
            .context("Failed to store session in keychain")
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }
}

/// Process-local storage, gone on exit.
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<SessionData>>,
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<SessionData>, LoadError> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(data.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
