//! Client configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! includes the API server address, where sessions are kept, and the last
//! email used to log in.
//!
//! Configuration is stored at `~/.config/taskpulse/config.json`. The
//! `TASKPULSE_SERVER_URL` and `TASKPULSE_SESSION_BACKEND` environment
//! variables override the file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_TIMEOUT_SECS;
use crate::auth::{FileStorage, KeyringStorage, SessionStorage};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "taskpulse";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Shortest request timeout; a zero timeout would fail every request
const MIN_TIMEOUT_SECS: u64 = 1;

pub const ENV_SERVER_URL: &str = "TASKPULSE_SERVER_URL";
pub const ENV_SESSION_BACKEND: &str = "TASKPULSE_SESSION_BACKEND";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SessionBackend::File),
            "keyring" => Ok(SessionBackend::Keyring),
            other => Err(anyhow::anyhow!(
                "Unknown session backend '{}' (expected 'file' or 'keyring')",
                other
            )),
        }
    }
}

impl fmt::Display for SessionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionBackend::File => f.write_str("file"),
            SessionBackend::Keyring => f.write_str("keyring"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub session_backend: SessionBackend,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            session_backend: SessionBackend::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
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

    /// Apply environment overrides, looked up through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVER_URL).filter(|v| !v.trim().is_empty()) {
            self.server_url = url;
        }
        if let Some(backend) = lookup(ENV_SESSION_BACKEND) {
            self.session_backend = backend
                .parse()
                .with_context(|| format!("Invalid {}", ENV_SESSION_BACKEND))?;
        }
        Ok(self)
    }

    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(MIN_TIMEOUT_SECS))
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

    /// Storage backend for the session, as configured
    pub fn session_storage(&self) -> Result<Arc<dyn SessionStorage>> {
        let storage: Arc<dyn SessionStorage> = match self.session_backend {
            SessionBackend::File => Arc::new(FileStorage::new(self.cache_dir()?)),
            SessionBackend::Keyring => Arc::new(KeyringStorage::new(self.server_url.clone())),
        };
        Ok(storage)
    }
}
